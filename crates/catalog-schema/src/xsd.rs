//! Tree-schema (XML Schema) loader

use crate::model::{
    AttributeSpec, ComplexType, ElementSpec, Facets, InlineType, SimpleType, TypeRegistry,
};
use crate::xml::XmlNode;
use crate::{Error, Result};
use catalog_model::{MaxOccurs, normalize_type};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info, trace, warn};

/// Namespace of XML Schema itself
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

static MESSAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":xsd:([a-z]{4}\.\d{3}\.\d{3}\.\d{2})").expect("message id pattern is valid")
});

/// Loads XML Schema documents into a [`TypeRegistry`]
#[derive(Debug, Default, Clone, Copy)]
pub struct XsdLoader;

impl XsdLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a schema from a file path
    pub fn load_from_file(&self, path: &Path) -> Result<TypeRegistry> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        trace!("Loading tree schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        self.load_from_str(&content)
    }

    /// Load a schema from XML text
    pub fn load_from_str(&self, xml: &str) -> Result<TypeRegistry> {
        let root = XmlNode::parse(xml)?;
        if root.name != "schema" {
            return Err(Error::Parse(format!(
                "root element is '{}', expected 'schema'",
                root.qualified_name
            )));
        }

        let mut namespaces: BTreeMap<String, String> = root
            .namespace_declarations()
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect();
        namespaces
            .entry("xs".to_string())
            .or_insert_with(|| XSD_NAMESPACE.to_string());

        let target_namespace = root.attr("targetNamespace").map(str::to_string);
        let mut registry = TypeRegistry::new(target_namespace, namespaces);

        for child in &root.children {
            match child.name.as_str() {
                "element" => {
                    if let Some(element) = parse_element(child)? {
                        registry.add_element(element);
                    }
                }
                "complexType" => match child.attr("name") {
                    Some(name) => registry.add_complex_type(parse_complex_type(child, name)?),
                    None => warn!("Skipping unnamed top-level complexType"),
                },
                "simpleType" => match child.attr("name") {
                    Some(name) => registry.add_simple_type(parse_simple_type(child, name)),
                    None => warn!("Skipping unnamed top-level simpleType"),
                },
                other => trace!("Ignoring top-level schema item: {}", other),
            }
        }

        info!(
            elements = registry.elements().len(),
            complex_types = registry.complex_types().len(),
            simple_types = registry.simple_types().len(),
            "Loaded tree schema"
        );

        Ok(registry)
    }
}

/// Message identifier embedded in a target namespace, or `unknown`
pub fn message_identifier(target_namespace: Option<&str>) -> String {
    target_namespace
        .and_then(|ns| MESSAGE_ID.captures(ns))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn documentation(node: &XmlNode) -> String {
    node.child("annotation")
        .and_then(|annotation| annotation.child("documentation"))
        .map(|doc| doc.text.trim().to_string())
        .unwrap_or_default()
}

fn parse_element(node: &XmlNode) -> Result<Option<ElementSpec>> {
    let reference = node.attr("ref").map(str::to_string);
    let name = match (node.attr("name"), &reference) {
        (Some(name), _) => name.to_string(),
        (None, Some(reference)) => normalize_type(reference),
        (None, None) => {
            warn!("Skipping element without name or ref");
            return Ok(None);
        }
    };

    let min_occurs = match node.attr("minOccurs") {
        Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
            Error::Parse(format!("element '{name}': invalid minOccurs '{raw}': {e}"))
        })?,
        None => 1,
    };
    let max_occurs = match node.attr("maxOccurs") {
        Some(raw) => MaxOccurs::from_str(raw)
            .map_err(|e| Error::Parse(format!("element '{name}': {e}")))?,
        None => MaxOccurs::Bounded(1),
    };

    let inline = if let Some(complex) = node.child("complexType") {
        Some(Box::new(InlineType::Complex(parse_complex_type(complex, "")?)))
    } else {
        node.child("simpleType")
            .map(|simple| Box::new(InlineType::Simple(parse_simple_type(simple, ""))))
    };

    Ok(Some(ElementSpec {
        name,
        type_name: node.attr("type").map(str::to_string),
        reference,
        min_occurs,
        max_occurs,
        nillable: node.attr("nillable") == Some("true"),
        documentation: documentation(node),
        inline,
    }))
}

fn parse_complex_type(node: &XmlNode, name: &str) -> Result<ComplexType> {
    let mut complex = ComplexType {
        name: name.to_string(),
        documentation: documentation(node),
        ..Default::default()
    };
    collect_content(node, &mut complex)?;
    let label = if name.is_empty() { "<inline>" } else { name };
    debug!(
        name = label,
        elements = complex.elements.len(),
        attributes = complex.attributes.len(),
        "Parsed complex type"
    );
    Ok(complex)
}

/// Gather particles and attributes of a complex type body, descending through
/// model groups and content derivations.
fn collect_content(node: &XmlNode, complex: &mut ComplexType) -> Result<()> {
    for child in &node.children {
        match child.name.as_str() {
            "sequence" | "choice" | "all" => collect_particles(child, complex)?,
            "attribute" => {
                if let Some(attribute) = parse_attribute(child) {
                    complex.attributes.push(attribute);
                }
            }
            "complexContent" | "simpleContent" => {
                for derivation in &child.children {
                    if matches!(derivation.name.as_str(), "extension" | "restriction") {
                        if let Some(base) = derivation.attr("base") {
                            complex.base = Some(normalize_type(base));
                        }
                        collect_content(derivation, complex)?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn collect_particles(group: &XmlNode, complex: &mut ComplexType) -> Result<()> {
    for child in &group.children {
        match child.name.as_str() {
            "element" => {
                if let Some(element) = parse_element(child)? {
                    complex.elements.push(element);
                }
            }
            "sequence" | "choice" | "all" => collect_particles(child, complex)?,
            "any" => trace!("Ignoring wildcard particle"),
            _ => {}
        }
    }
    Ok(())
}

fn parse_attribute(node: &XmlNode) -> Option<AttributeSpec> {
    let name = node
        .attr("name")
        .map(str::to_string)
        .or_else(|| node.attr("ref").map(normalize_type));
    let Some(name) = name else {
        warn!("Skipping attribute without name or ref");
        return None;
    };

    Some(AttributeSpec {
        name,
        type_name: node.attr("type").map(str::to_string),
        required: node.attr("use") == Some("required"),
        documentation: documentation(node),
        inline: node.child("simpleType").map(|simple| parse_simple_type(simple, "")),
    })
}

fn parse_simple_type(node: &XmlNode, name: &str) -> SimpleType {
    let restriction = node.child("restriction");
    let base = restriction
        .and_then(|r| r.attr("base"))
        .map(normalize_type)
        .unwrap_or_else(|| "string".to_string());

    SimpleType {
        name: name.to_string(),
        base,
        facets: restriction.map(parse_facets).unwrap_or_default(),
        documentation: documentation(node),
    }
}

fn parse_facets(restriction: &XmlNode) -> Facets {
    let mut facets = Facets::default();

    for facet in &restriction.children {
        let Some(value) = facet.attr("value") else {
            continue;
        };
        match facet.name.as_str() {
            "maxLength" => facets.max_length = parse_count(facet, value),
            "minLength" => facets.min_length = parse_count(facet, value),
            "totalDigits" => facets.total_digits = parse_count(facet, value),
            "fractionDigits" => facets.fraction_digits = parse_count(facet, value),
            "minInclusive" => facets.min_inclusive = parse_bound(facet, value),
            "maxInclusive" => facets.max_inclusive = parse_bound(facet, value),
            "pattern" => {
                if facets.pattern.is_none() {
                    facets.pattern = Some(value.to_string());
                }
            }
            "enumeration" => {
                if !value.is_empty() {
                    facets.enumerations.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    facets
}

fn parse_count(facet: &XmlNode, value: &str) -> Option<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(facet = %facet.name, value, "Skipping unparsable facet: {}", e);
            None
        }
    }
}

fn parse_bound(facet: &XmlNode, value: &str) -> Option<f64> {
    match value.trim().parse::<f64>() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(facet = %facet.name, value, "Skipping unparsable facet: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.09"
           targetNamespace="urn:iso:std:iso:20022:tech:xsd:pain.001.001.09">
  <xs:element name="Document" type="Document"/>
  <xs:complexType name="Document">
    <xs:sequence>
      <xs:element name="GrpHdr" type="GroupHeader"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="GroupHeader">
    <xs:sequence>
      <xs:element name="MsgId" type="Max35Text">
        <xs:annotation><xs:documentation>  Message identification.  </xs:documentation></xs:annotation>
      </xs:element>
      <xs:element name="NbOfTxs" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
      <xs:choice>
        <xs:element name="Cd" type="Code"/>
        <xs:element name="Prtry" type="Max35Text"/>
      </xs:choice>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="Amount">
    <xs:simpleContent>
      <xs:extension base="xs:decimal">
        <xs:attribute name="Ccy" type="xs:string" use="required"/>
      </xs:extension>
    </xs:simpleContent>
  </xs:complexType>
  <xs:simpleType name="Max35Text">
    <xs:restriction base="xs:string">
      <xs:minLength value="1"/>
      <xs:maxLength value="35"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="Code">
    <xs:restriction base="xs:string">
      <xs:enumeration value="A"/>
      <xs:enumeration value="B"/>
      <xs:totalDigits value="not-a-number"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"#;

    #[test]
    fn test_load_registry() {
        let registry = XsdLoader::new().load_from_str(SCHEMA).unwrap();

        assert_eq!(registry.elements().len(), 1);
        assert_eq!(registry.complex_types().len(), 3);
        assert_eq!(registry.simple_types().len(), 2);
        assert_eq!(registry.namespaces.get("xs").map(String::as_str), Some(XSD_NAMESPACE));
        assert_eq!(
            registry.namespaces.get("").map(String::as_str),
            Some("urn:iso:std:iso:20022:tech:xsd:pain.001.001.09")
        );
    }

    #[test]
    fn test_particles_and_occurs() {
        let registry = XsdLoader::new().load_from_str(SCHEMA).unwrap();
        let header = registry.complex_type("GroupHeader").unwrap();

        let names: Vec<_> = header.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["MsgId", "NbOfTxs", "Cd", "Prtry"]);

        let msg_id = &header.elements[0];
        assert_eq!(msg_id.documentation, "Message identification.");
        assert_eq!(msg_id.min_occurs, 1);

        let nb = &header.elements[1];
        assert_eq!(nb.min_occurs, 0);
        assert_eq!(nb.max_occurs, MaxOccurs::Unbounded);
    }

    #[test]
    fn test_simple_content_attributes() {
        let registry = XsdLoader::new().load_from_str(SCHEMA).unwrap();
        let amount = registry.complex_type("Amount").unwrap();
        assert_eq!(amount.base.as_deref(), Some("decimal"));
        assert_eq!(amount.attributes.len(), 1);
        assert!(amount.attributes[0].required);
    }

    #[test]
    fn test_facets_and_bad_numeric_facet() {
        let registry = XsdLoader::new().load_from_str(SCHEMA).unwrap();
        let text = registry.simple_type("Max35Text").unwrap();
        assert_eq!(text.base, "string");
        assert_eq!(text.facets.max_length, Some(35));
        assert_eq!(text.facets.min_length, Some(1));

        let code = registry.simple_type("Code").unwrap();
        assert_eq!(code.facets.enumerations, vec!["A", "B"]);
        assert_eq!(code.facets.total_digits, None);
    }

    #[test]
    fn test_message_identifier() {
        assert_eq!(
            message_identifier(Some("urn:iso:std:iso:20022:tech:xsd:pain.001.001.09")),
            "pain.001.001.09"
        );
        assert_eq!(message_identifier(Some("urn:example")), "unknown");
        assert_eq!(message_identifier(None), "unknown");
    }

    #[test]
    fn test_non_schema_root_is_parse_error() {
        let err = XsdLoader::new().load_from_str("<Document/>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_invalid_min_occurs_is_parse_error() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="A" minOccurs="many"/>
        </xs:schema>"#;
        let err = XsdLoader::new().load_from_str(xml).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = XsdLoader::new()
            .load_from_file(Path::new("/nonexistent/schema.xsd"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
