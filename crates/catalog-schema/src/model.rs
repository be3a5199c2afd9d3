//! Type registry built from a tree schema

use catalog_model::{Constraints, MaxOccurs, normalize_type};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Restriction facets of a simple type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumerations: Vec<String>,
}

impl Facets {
    /// Facets expressed as field constraints (enumerations excluded)
    pub fn constraints(&self) -> Constraints {
        Constraints {
            max_length: self.max_length,
            min_length: self.min_length,
            pattern: self.pattern.clone(),
            total_digits: self.total_digits,
            fraction_digits: self.fraction_digits,
            minimum: self.min_inclusive,
            maximum: self.max_inclusive,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints().is_empty() && self.enumerations.is_empty()
    }
}

/// Simple type: a primitive base narrowed by facets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleType {
    /// Declared name, empty for an inline declaration
    pub name: String,
    /// Normalized base type name
    pub base: String,
    pub facets: Facets,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

/// Attribute declared on a complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<SimpleType>,
}

impl AttributeSpec {
    /// Normalized declared type, the inline base, or `string`
    pub fn data_type(&self) -> String {
        match (&self.type_name, &self.inline) {
            (Some(type_name), _) => normalize_type(type_name),
            (None, Some(inline)) => inline.base.clone(),
            (None, None) => "string".to_string(),
        }
    }
}

/// Anonymous type declared inside an element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum InlineType {
    Simple(SimpleType),
    Complex(ComplexType),
}

/// Element particle, either global or local to a complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Declared name; for a reference, the referenced element's local name
    pub name: String,
    /// Declared type as written (possibly prefixed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Target of a `ref=` particle as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub nillable: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<Box<InlineType>>,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            reference: None,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            nillable: false,
            documentation: String::new(),
            inline: None,
        }
    }

    /// Normalized declared type name, if any
    pub fn normalized_type(&self) -> Option<String> {
        self.type_name.as_deref().map(normalize_type)
    }

    pub fn inline_simple(&self) -> Option<&SimpleType> {
        match self.inline.as_deref() {
            Some(InlineType::Simple(simple)) => Some(simple),
            _ => None,
        }
    }

    pub fn inline_complex(&self) -> Option<&ComplexType> {
        match self.inline.as_deref() {
            Some(InlineType::Complex(complex)) => Some(complex),
            _ => None,
        }
    }

    /// Catalog type name: declared type, inline base, `anonymous` or `anyType`
    pub fn data_type(&self) -> String {
        if let Some(type_name) = self.normalized_type() {
            return type_name;
        }
        match self.inline.as_deref() {
            Some(InlineType::Simple(simple)) => simple.base.clone(),
            Some(InlineType::Complex(_)) => "anonymous".to_string(),
            None => "anyType".to_string(),
        }
    }
}

/// Complex type: ordered child elements plus attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexType {
    /// Declared name, empty for an inline declaration
    pub name: String,
    /// Base named by a content extension or restriction; recorded, not merged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub elements: Vec<ElementSpec>,
    pub attributes: Vec<AttributeSpec>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

/// Named types and global elements of one tree schema.
///
/// Built once by the loader and read-only afterwards. Lookups accept
/// prefixed or bracket-qualified names and normalize them first.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRegistry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    /// Namespace declarations of the schema root, prefix to URI
    pub namespaces: BTreeMap<String, String>,
    elements: Vec<ElementSpec>,
    complex_types: Vec<ComplexType>,
    simple_types: Vec<SimpleType>,
    #[serde(skip)]
    element_index: HashMap<String, usize>,
    #[serde(skip)]
    complex_index: HashMap<String, usize>,
    #[serde(skip)]
    simple_index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub(crate) fn new(target_namespace: Option<String>, namespaces: BTreeMap<String, String>) -> Self {
        Self {
            target_namespace,
            namespaces,
            ..Default::default()
        }
    }

    pub(crate) fn add_element(&mut self, element: ElementSpec) {
        self.element_index
            .entry(element.name.clone())
            .or_insert(self.elements.len());
        self.elements.push(element);
    }

    pub(crate) fn add_complex_type(&mut self, complex: ComplexType) {
        self.complex_index
            .entry(complex.name.clone())
            .or_insert(self.complex_types.len());
        self.complex_types.push(complex);
    }

    pub(crate) fn add_simple_type(&mut self, simple: SimpleType) {
        self.simple_index
            .entry(simple.name.clone())
            .or_insert(self.simple_types.len());
        self.simple_types.push(simple);
    }

    /// Global elements in document order
    pub fn elements(&self) -> &[ElementSpec] {
        &self.elements
    }

    /// Named complex types in document order
    pub fn complex_types(&self) -> &[ComplexType] {
        &self.complex_types
    }

    /// Named simple types in document order
    pub fn simple_types(&self) -> &[SimpleType] {
        &self.simple_types
    }

    pub fn element(&self, name: &str) -> Option<&ElementSpec> {
        self.element_index
            .get(&normalize_type(name))
            .map(|&i| &self.elements[i])
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_index
            .get(&normalize_type(name))
            .map(|&i| &self.complex_types[i])
    }

    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_index
            .get(&normalize_type(name))
            .map(|&i| &self.simple_types[i])
    }

    pub fn is_complex(&self, name: &str) -> bool {
        self.complex_type(name).is_some()
    }

    /// The element named `preferred`, or the first global element
    pub fn root_element(&self, preferred: &str) -> Option<&ElementSpec> {
        self.element(preferred).or_else(|| self.elements.first())
    }

    /// Whether the registry holds no types and no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.complex_types.is_empty() && self.simple_types.is_empty()
    }
}
