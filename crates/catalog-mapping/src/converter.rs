//! Whole-schema conversion from a tree-schema registry
//!
//! The Avro output has one record per named complex type plus a wrapper
//! record for every global element not typed by one of them. The JSON
//! Schema output is a single document with `definitions` for every named
//! type and `properties` for every global element.

use crate::mapper::TypeMapper;
use crate::vocabulary::TargetVocabulary;
use catalog_schema::extract::{Extraction, extract, extract_attribute, extract_element};
use catalog_schema::{AttributeSpec, ComplexType, ElementSpec, InlineType, SimpleType, TypeRegistry};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

/// Namespace used for Avro records when none is given
pub const DEFAULT_NAMESPACE: &str = "com.example";

/// Dialect URI written to `$schema`
pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Field holding the text value of a complex type with simple content
const SIMPLE_CONTENT_FIELD: &str = "value";

/// Result of a conversion.
///
/// Callers must handle all three shapes: one record is returned bare, several
/// are returned as an ordered list, and an empty registry yields a
/// placeholder record with no fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConvertedSchema {
    Single(Value),
    Multiple(Vec<Value>),
    Empty(Value),
}

impl ConvertedSchema {
    fn from_records(mut records: Vec<Value>, placeholder: impl FnOnce() -> Value) -> Self {
        match records.len() {
            0 => ConvertedSchema::Empty(placeholder()),
            1 => ConvertedSchema::Single(records.remove(0)),
            _ => ConvertedSchema::Multiple(records),
        }
    }

    /// Records or documents produced, placeholder included
    pub fn records(&self) -> &[Value] {
        match self {
            ConvertedSchema::Single(value) | ConvertedSchema::Empty(value) => {
                std::slice::from_ref(value)
            }
            ConvertedSchema::Multiple(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConvertedSchema::Empty(_))
    }

    /// The JSON value as it should be written out
    pub fn to_value(&self) -> Value {
        match self {
            ConvertedSchema::Single(value) | ConvertedSchema::Empty(value) => value.clone(),
            ConvertedSchema::Multiple(values) => Value::Array(values.clone()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ConvertedSchema::Single(value) | ConvertedSchema::Empty(value) => value,
            ConvertedSchema::Multiple(values) => Value::Array(values),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Converts a tree-schema registry into a target representation
#[derive(Debug, Clone)]
pub struct SchemaConverter<'a> {
    registry: &'a TypeRegistry,
    namespace: String,
}

impl<'a> SchemaConverter<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Set the Avro namespace; an empty value keeps the default
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !namespace.trim().is_empty() {
            self.namespace = namespace;
        }
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn convert(&self, target: TargetVocabulary) -> ConvertedSchema {
        let converted = match target {
            TargetVocabulary::Avro => self.to_avro(),
            TargetVocabulary::JsonSchema => ConvertedSchema::Single(self.to_json_schema()),
        };
        info!(
            vocabulary = %target,
            records = converted.records().len(),
            "Schema converted"
        );
        converted
    }

    /// Avro record set
    pub fn to_avro(&self) -> ConvertedSchema {
        let mapper = TypeMapper::new(self.registry, TargetVocabulary::Avro);
        let mut records = Vec::new();

        for complex in self.registry.complex_types() {
            records.push(self.avro_record(&mapper, &complex.name, complex));
        }

        for element in self.registry.elements() {
            let covered = element
                .normalized_type()
                .is_some_and(|type_name| self.registry.is_complex(&type_name));
            if covered {
                continue;
            }
            debug!(element = %element.name, "Wrapping uncovered root element");
            let value = self.avro_element_type(&mapper, None, element, element);
            records.push(json!({
                "type": "record",
                "name": element.name,
                "namespace": self.namespace,
                "fields": [{ "name": "value", "type": value }],
            }));
        }

        ConvertedSchema::from_records(records, || {
            json!({
                "type": "record",
                "name": "Root",
                "namespace": self.namespace,
                "fields": [],
            })
        })
    }

    fn avro_record(&self, mapper: &TypeMapper<'_>, name: &str, complex: &ComplexType) -> Value {
        let mut fields = Vec::with_capacity(complex.elements.len() + complex.attributes.len());
        for element in &complex.elements {
            fields.push(self.avro_element_field(mapper, name, element));
        }
        if let Some(base) = self.simple_content_base(complex) {
            let mut value = Map::new();
            value.insert("name".into(), json!(SIMPLE_CONTENT_FIELD));
            value.insert("type".into(), mapper.map_type(base));
            avro_constraints(&mut value, &extract(self.registry, None, Some(base)));
            fields.push(Value::Object(value));
        }
        for attribute in &complex.attributes {
            fields.push(self.avro_attribute_field(mapper, attribute));
        }

        let mut record = Map::new();
        record.insert("type".into(), json!("record"));
        record.insert("name".into(), json!(name));
        record.insert("namespace".into(), json!(self.namespace));
        if !complex.documentation.is_empty() {
            record.insert("doc".into(), json!(complex.documentation));
        }
        record.insert("fields".into(), Value::Array(fields));
        Value::Object(record)
    }

    fn avro_element_field(
        &self,
        mapper: &TypeMapper<'_>,
        owner: &str,
        particle: &ElementSpec,
    ) -> Value {
        let declaration = self.resolve(particle);
        let nullable = particle.min_occurs == 0 || declaration.nillable;

        let mut field = Map::new();
        field.insert("name".into(), json!(particle.name));
        field.insert(
            "type".into(),
            self.avro_element_type(mapper, Some(owner), particle, declaration),
        );
        let documentation = first_non_empty(&particle.documentation, &declaration.documentation);
        if !documentation.is_empty() {
            field.insert("doc".into(), json!(documentation));
        }
        if nullable {
            field.insert("default".into(), Value::Null);
        }
        avro_constraints(&mut field, &extract_element(self.registry, declaration));
        Value::Object(field)
    }

    /// Wrapped Avro type of `particle`, whose type comes from `declaration`.
    /// `owner` names the enclosing record, if any.
    fn avro_element_type(
        &self,
        mapper: &TypeMapper<'_>,
        owner: Option<&str>,
        particle: &ElementSpec,
        declaration: &ElementSpec,
    ) -> Value {
        let base = match declaration.inline_complex() {
            Some(inline) if declaration.type_name.is_none() => {
                self.avro_record(mapper, &inline_name(owner, &declaration.name), inline)
            }
            _ => mapper.map_type(&declaration.data_type()),
        };
        mapper.wrap(
            base,
            particle.max_occurs.is_repeatable(),
            particle.min_occurs == 0 || declaration.nillable,
        )
    }

    fn avro_attribute_field(&self, mapper: &TypeMapper<'_>, attribute: &AttributeSpec) -> Value {
        let mut field = Map::new();
        field.insert("name".into(), json!(attribute.name));
        field.insert(
            "type".into(),
            mapper.wrap(mapper.map_type(&attribute.data_type()), false, !attribute.required),
        );
        if !attribute.documentation.is_empty() {
            field.insert("doc".into(), json!(attribute.documentation));
        }
        if !attribute.required {
            field.insert("default".into(), Value::Null);
        }
        avro_constraints(&mut field, &extract_attribute(self.registry, attribute));
        Value::Object(field)
    }

    /// JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mapper = TypeMapper::new(self.registry, TargetVocabulary::JsonSchema);

        let mut definitions = Map::new();
        for complex in self.registry.complex_types() {
            definitions.insert(complex.name.clone(), self.json_object(&mapper, complex));
        }
        for simple in self.registry.simple_types() {
            definitions.insert(simple.name.clone(), json_simple(&mapper, simple));
        }

        let mut properties = Map::new();
        for element in self.registry.elements() {
            properties.insert(element.name.clone(), self.json_element(&mapper, element));
        }

        json!({
            "$schema": JSON_SCHEMA_DIALECT,
            "$id": self.registry.target_namespace.clone().unwrap_or_default(),
            "type": "object",
            "properties": properties,
            "definitions": definitions,
        })
    }

    fn json_object(&self, mapper: &TypeMapper<'_>, complex: &ComplexType) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for element in &complex.elements {
            properties.insert(element.name.clone(), self.json_element(mapper, element));
            if element.min_occurs >= 1 {
                required.push(json!(element.name));
            }
        }
        if let Some(base) = self.simple_content_base(complex) {
            properties.insert(SIMPLE_CONTENT_FIELD.into(), mapper.map_type(base));
            required.push(json!(SIMPLE_CONTENT_FIELD));
        }
        for attribute in &complex.attributes {
            properties.insert(attribute.name.clone(), self.json_attribute(mapper, attribute));
            if attribute.required {
                required.push(json!(attribute.name));
            }
        }

        let mut object = Map::new();
        object.insert("type".into(), json!("object"));
        if !complex.documentation.is_empty() {
            object.insert("description".into(), json!(complex.documentation));
        }
        object.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            object.insert("required".into(), Value::Array(required));
        }
        Value::Object(object)
    }

    fn json_element(&self, mapper: &TypeMapper<'_>, particle: &ElementSpec) -> Value {
        let declaration = self.resolve(particle);
        let base = match (declaration.type_name.as_ref(), declaration.inline.as_deref()) {
            (None, Some(InlineType::Complex(inline))) => self.json_object(mapper, inline),
            (None, Some(InlineType::Simple(inline))) => json_simple(mapper, inline),
            _ => mapper.map_type(&declaration.data_type()),
        };
        let mut schema = mapper.wrap(base, particle.max_occurs.is_repeatable(), declaration.nillable);

        let documentation = first_non_empty(&particle.documentation, &declaration.documentation);
        if !documentation.is_empty() {
            if let Value::Object(object) = &mut schema {
                object
                    .entry("description")
                    .or_insert_with(|| json!(documentation));
            }
        }
        schema
    }

    fn json_attribute(&self, mapper: &TypeMapper<'_>, attribute: &AttributeSpec) -> Value {
        match (&attribute.type_name, &attribute.inline) {
            (None, Some(inline)) => json_simple(mapper, inline),
            _ => mapper.map_type(&attribute.data_type()),
        }
    }

    /// Base of a complex type with simple content: a simple base and no child elements
    fn simple_content_base<'c>(&self, complex: &'c ComplexType) -> Option<&'c str> {
        complex
            .base
            .as_deref()
            .filter(|base| complex.elements.is_empty() && !self.registry.is_complex(base))
    }

    /// The global declaration behind a `ref=` particle, or the particle itself
    fn resolve<'p>(&'p self, particle: &'p ElementSpec) -> &'p ElementSpec {
        particle
            .reference
            .as_deref()
            .and_then(|reference| self.registry.element(reference))
            .unwrap_or(particle)
    }
}

/// JSON Schema for a simple type: its primitive plus facets and enumeration
fn json_simple(mapper: &TypeMapper<'_>, simple: &SimpleType) -> Value {
    let facets = &simple.facets;
    let mut schema = Map::new();
    schema.insert("type".into(), json!(mapper.resolve_primitive(&simple.base)));
    if !simple.documentation.is_empty() {
        schema.insert("description".into(), json!(simple.documentation));
    }
    if let Some(max_length) = facets.max_length {
        schema.insert("maxLength".into(), json!(max_length));
    }
    if let Some(min_length) = facets.min_length {
        schema.insert("minLength".into(), json!(min_length));
    }
    if let Some(pattern) = &facets.pattern {
        schema.insert("pattern".into(), json!(pattern));
    }
    if let Some(minimum) = facets.min_inclusive {
        schema.insert("minimum".into(), json!(minimum));
    }
    if let Some(maximum) = facets.max_inclusive {
        schema.insert("maximum".into(), json!(maximum));
    }
    if !facets.enumerations.is_empty() {
        schema.insert("enum".into(), json!(facets.enumerations));
    }
    Value::Object(schema)
}

/// Custom field properties the record loader reads back
fn avro_constraints(field: &mut Map<String, Value>, extraction: &Extraction) {
    let constraints = &extraction.constraints;
    if let Some(max_length) = constraints.max_length {
        field.insert("maxLength".into(), json!(max_length));
    }
    if let Some(min_length) = constraints.min_length {
        field.insert("minLength".into(), json!(min_length));
    }
    if let Some(pattern) = &constraints.pattern {
        field.insert("pattern".into(), json!(pattern));
    }
    if !extraction.code_list.is_empty() {
        field.insert("enum".into(), json!(extraction.code_list));
    }
}

/// Record name for an anonymous complex type, qualified by its owner so
/// that equal element names under different parents stay distinct
fn inline_name(owner: Option<&str>, element_name: &str) -> String {
    match owner {
        Some(owner) => {
            let owner = owner.strip_suffix("Type").unwrap_or(owner);
            format!("{owner}{element_name}Type")
        }
        None => format!("{element_name}Type"),
    }
}

fn first_non_empty<'s>(first: &'s str, second: &'s str) -> &'s str {
    if first.is_empty() { second } else { first }
}
