//! Field flattening for both schema forms
//!
//! Both walkers are depth-first and pre-order: a field is emitted before the
//! fields of the structure it expands into. A named structure is expanded at
//! most once along any root-to-leaf chain; a recurring reference on the same
//! chain is emitted as an unexpanded leaf.

use crate::extract::{extract_attribute, extract_element};
use crate::model::{AttributeSpec, ComplexType, ElementSpec, TypeRegistry};
use crate::record::RecordSchema;
use catalog_model::{Cardinality, Constraints, Field, MaxOccurs, join_path};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, trace, warn};

/// Path separator of tree-schema fields
pub const TREE_SEPARATOR: char = '/';

/// Path separator of record-schema fields
pub const RECORD_SEPARATOR: char = '.';

/// Flatten a tree schema starting at the global element `root`.
///
/// Falls back to the first global element when `root` is not declared; a
/// registry without global elements yields no fields. The root element
/// itself is not emitted, so paths start at its children.
pub fn flatten_tree(registry: &TypeRegistry, root: &str) -> Vec<Field> {
    let Some(root_element) = registry.root_element(root) else {
        warn!("Schema declares no global element, catalog is empty");
        return Vec::new();
    };
    if root_element.name != root {
        info!(
            "Root element '{}' not found, using first global element '{}'",
            root, root_element.name
        );
    }

    let mut walker = TreeFlattener {
        registry,
        active: HashSet::new(),
        fields: Vec::new(),
    };
    walker.expand_declaration(root_element, "", Some(element_key(&root_element.name)));

    debug!(field_count = walker.fields.len(), root = %root_element.name, "Flattened tree schema");
    walker.fields
}

fn element_key(name: &str) -> String {
    format!("element:{name}")
}

struct TreeFlattener<'a> {
    registry: &'a TypeRegistry,
    /// Structures being expanded on the current chain
    active: HashSet<String>,
    fields: Vec<Field>,
}

impl TreeFlattener<'_> {
    fn expand_declaration(&mut self, declaration: &ElementSpec, path: &str, key: Option<String>) {
        let Some(key) = key else {
            self.expand_content(declaration, path);
            return;
        };
        if !self.enter(&key, path) {
            return;
        }
        self.expand_content(declaration, path);
        self.active.remove(&key);
    }

    fn expand_content(&mut self, declaration: &ElementSpec, path: &str) {
        let registry = self.registry;
        if let Some(type_name) = declaration.normalized_type() {
            if let Some(complex) = registry.complex_type(&type_name) {
                if self.enter(&type_name, path) {
                    self.expand_complex(complex, path);
                    self.active.remove(&type_name);
                }
            }
        } else if let Some(inline) = declaration.inline_complex() {
            self.expand_complex(inline, path);
        }
    }

    /// Mark `key` active; false when it is already being expanded on this chain
    fn enter(&mut self, key: &str, path: &str) -> bool {
        if self.active.contains(key) {
            debug!(structure = key, path, "Recurring structure left unexpanded");
            return false;
        }
        self.active.insert(key.to_string());
        true
    }

    fn expand_complex(&mut self, complex: &ComplexType, path: &str) {
        for attribute in &complex.attributes {
            self.visit_attribute(attribute, path);
        }
        for element in &complex.elements {
            self.visit_element(element, path);
        }
    }

    fn visit_element(&mut self, particle: &ElementSpec, parent: &str) {
        let registry = self.registry;
        let (declaration, key) = match &particle.reference {
            Some(reference) => match registry.element(reference) {
                Some(global) => (global, Some(element_key(&global.name))),
                None => {
                    warn!(reference = %reference, "Unresolved element reference");
                    (particle, None)
                }
            },
            None => (particle, None),
        };

        let path = join_path(parent, &declaration.name, TREE_SEPARATOR);
        let documentation = if particle.documentation.is_empty() {
            &declaration.documentation
        } else {
            &particle.documentation
        };
        let extraction = extract_element(registry, declaration);

        trace!(path = %path, "Emitting element field");
        self.fields.push(
            Field::new(
                &declaration.name,
                &path,
                declaration.data_type(),
                Cardinality::new(particle.min_occurs, particle.max_occurs),
            )
            .with_parent_path(parent)
            .with_documentation(documentation)
            .with_constraints(extraction.constraints)
            .with_code_list(extraction.code_list),
        );

        self.expand_declaration(declaration, &path, key);
    }

    fn visit_attribute(&mut self, attribute: &AttributeSpec, parent: &str) {
        let name = format!("@{}", attribute.name);
        let path = join_path(parent, &name, TREE_SEPARATOR);
        let cardinality = if attribute.required {
            Cardinality::required()
        } else {
            Cardinality::optional()
        };
        let extraction = extract_attribute(self.registry, attribute);

        self.fields.push(
            Field::new(name, path, attribute.data_type(), cardinality)
                .with_parent_path(parent)
                .with_documentation(&attribute.documentation)
                .with_constraints(extraction.constraints)
                .with_code_list(extraction.code_list),
        );
    }
}

static NULL_TYPE: Value = Value::Null;

/// Flatten a record schema starting at its root record.
///
/// Named records, enums and fixed types are indexed as they are met, so a
/// later reference by name resolves to the earlier declaration.
pub fn flatten_record(schema: &RecordSchema) -> Vec<Field> {
    let mut walker = RecordFlattener {
        namespace: schema.namespace.clone(),
        named: HashMap::new(),
        active: HashSet::new(),
        fields: Vec::new(),
    };
    walker.register(schema.root());
    if !schema.name.is_empty() {
        walker.active.insert(schema.name.clone());
    }
    walker.walk_fields(schema.fields(), "");

    debug!(field_count = walker.fields.len(), record = %schema.name, "Flattened record schema");
    walker.fields
}

struct RecordFlattener<'a> {
    namespace: Option<String>,
    /// Named declarations discovered so far
    named: HashMap<String, &'a Value>,
    /// Records being expanded on the current chain
    active: HashSet<String>,
    fields: Vec<Field>,
}

/// Field type after union and array unwrapping
struct Shape<'a> {
    nullable: bool,
    /// Representative member, resolved if it was a named reference
    declared: &'a Value,
    /// Array item when `declared` is an array, otherwise `declared`
    element: &'a Value,
    is_array: bool,
}

impl<'a> RecordFlattener<'a> {
    fn register(&mut self, declaration: &'a Value) {
        let kind = declaration.get("type").and_then(Value::as_str);
        if !matches!(kind, Some("record" | "enum" | "fixed")) {
            return;
        }
        let Some(name) = declaration.get("name").and_then(Value::as_str) else {
            return;
        };

        let namespace = declaration
            .get("namespace")
            .and_then(Value::as_str)
            .or(self.namespace.as_deref());
        if let Some(namespace) = namespace {
            self.named.insert(format!("{namespace}.{name}"), declaration);
        }
        let short = name.rsplit('.').next().unwrap_or(name);
        self.named.insert(short.to_string(), declaration);
        self.named.insert(name.to_string(), declaration);
        trace!(name, "Registered named declaration");
    }

    fn resolve(&self, value: &'a Value) -> &'a Value {
        let Some(name) = value.as_str() else {
            return value;
        };
        let short = name.rsplit('.').next().unwrap_or(name);
        self.named
            .get(name)
            .or_else(|| self.named.get(short))
            .copied()
            .unwrap_or(value)
    }

    /// First non-null member of a union and whether `null` was a member
    fn unwrap_union(&mut self, ty: &'a Value) -> (bool, &'a Value) {
        match ty {
            Value::Array(members) => {
                for member in members {
                    self.register(member);
                }
                let representative = members
                    .iter()
                    .find(|m| m.as_str() != Some("null"))
                    .unwrap_or(&NULL_TYPE);
                (members.iter().any(|m| m.as_str() == Some("null")), representative)
            }
            other => {
                self.register(other);
                (false, other)
            }
        }
    }

    fn shape(&mut self, ty: &'a Value) -> Shape<'a> {
        let (nullable, representative) = self.unwrap_union(ty);

        let declared = self.resolve(representative);
        if declared.get("type").and_then(Value::as_str) == Some("array") {
            // Null items leave the field's own requirement alone
            let (_, item) = self.unwrap_union(declared.get("items").unwrap_or(&NULL_TYPE));
            return Shape {
                nullable,
                declared,
                element: self.resolve(item),
                is_array: true,
            };
        }

        Shape {
            nullable,
            declared,
            element: declared,
            is_array: false,
        }
    }

    fn walk_fields(&mut self, fields: &'a [Value], parent: &str) {
        for definition in fields {
            self.visit_field(definition, parent);
        }
    }

    fn visit_field(&mut self, definition: &'a Value, parent: &str) {
        let name = definition
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let path = join_path(parent, name, RECORD_SEPARATOR);

        let Some(ty) = definition.get("type") else {
            warn!(path = %path, "Record field without a type");
            self.fields.push(
                Field::new(name, &path, "unknown", Cardinality::required()).with_parent_path(parent),
            );
            return;
        };
        let shape = self.shape(ty);

        let has_default = definition.get("default").is_some_and(|d| !d.is_null());
        let min = if shape.nullable || has_default { 0 } else { 1 };
        let max = if shape.is_array {
            MaxOccurs::Unbounded
        } else {
            MaxOccurs::Bounded(1)
        };

        let data_type = type_name(shape.element);
        let type_tag = if shape.is_array {
            format!("array<{data_type}>")
        } else {
            data_type.clone()
        };
        let constraints = record_constraints(definition, &shape, type_tag);
        let code_list = enum_symbols(shape.element);
        let documentation = definition
            .get("doc")
            .and_then(Value::as_str)
            .unwrap_or_default();

        trace!(path = %path, "Emitting record field");
        self.fields.push(
            Field::new(name, &path, data_type, Cardinality::new(min, max))
                .with_parent_path(parent)
                .with_documentation(documentation)
                .with_constraints(constraints)
                .with_code_list(code_list),
        );

        self.expand_record(shape.element, &path);
    }

    fn expand_record(&mut self, declaration: &'a Value, path: &str) {
        if declaration.get("type").and_then(Value::as_str) != Some("record") {
            return;
        }
        let nested = declaration
            .get("fields")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        match declaration.get("name").and_then(Value::as_str) {
            Some(name) => {
                if self.active.contains(name) {
                    debug!(record = name, path, "Recurring record left unexpanded");
                    return;
                }
                self.active.insert(name.to_string());
                self.walk_fields(nested, path);
                self.active.remove(name);
            }
            None => self.walk_fields(nested, path),
        }
    }
}

/// Catalog type name of a record-schema type expression
fn type_name(value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        Value::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some(kind @ ("record" | "enum" | "fixed")) => map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(kind)
                .to_string(),
            Some(kind) => kind.to_string(),
            None => "unknown".to_string(),
        },
        Value::Null => "null".to_string(),
        Value::Array(_) => "union".to_string(),
        _ => "unknown".to_string(),
    }
}

fn record_constraints(definition: &Value, shape: &Shape<'_>, type_tag: String) -> Constraints {
    let logical_type = [shape.declared, shape.element]
        .iter()
        .find_map(|v| v.get("logicalType").and_then(Value::as_str))
        .map(str::to_string);

    let count = |key: &str| {
        definition
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };

    Constraints {
        max_length: count("maxLength"),
        min_length: count("minLength"),
        pattern: definition
            .get("pattern")
            .and_then(Value::as_str)
            .map(str::to_string),
        minimum: definition.get("minimum").and_then(Value::as_f64),
        maximum: definition.get("maximum").and_then(Value::as_f64),
        logical_type,
        type_tag: Some(type_tag),
        ..Default::default()
    }
}

fn enum_symbols(declaration: &Value) -> Vec<String> {
    if declaration.get("type").and_then(Value::as_str) != Some("enum") {
        return Vec::new();
    }
    declaration
        .get("symbols")
        .and_then(Value::as_array)
        .map(|symbols| {
            symbols
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
