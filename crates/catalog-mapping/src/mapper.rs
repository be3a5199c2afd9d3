//! Cross-format type mapper

use crate::vocabulary::{FALLBACK_TYPE, TargetVocabulary};
use catalog_model::{Field, normalize_type};
use catalog_schema::TypeRegistry;
use serde_json::{Value, json};

/// Maps tree-schema type names into one target vocabulary.
///
/// Named complex types become references to the same name. Named simple
/// types resolve to their primitive base for Avro and to a definition
/// reference for JSON Schema, where the definition keeps the facets.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    registry: &'a TypeRegistry,
    vocabulary: TargetVocabulary,
}

impl<'a> TypeMapper<'a> {
    pub fn new(registry: &'a TypeRegistry, vocabulary: TargetVocabulary) -> Self {
        Self {
            registry,
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> TargetVocabulary {
        self.vocabulary
    }

    /// Target type expression for a bare source type, without occurrence wrapping
    pub fn map_type(&self, source_type: &str) -> Value {
        let local = normalize_type(source_type);

        if self.registry.is_complex(&local) {
            return self.reference(&local);
        }

        match self.vocabulary {
            TargetVocabulary::Avro => json!(self.resolve_primitive(&local)),
            TargetVocabulary::JsonSchema if self.registry.simple_type(&local).is_some() => {
                self.reference(&local)
            }
            TargetVocabulary::JsonSchema => json!({ "type": self.resolve_primitive(&local) }),
        }
    }

    /// Target type expression for a catalog field, wrapped for repetition and optionality
    pub fn map_field(&self, field: &Field) -> Value {
        self.wrap(
            self.map_type(&field.data_type),
            field.cardinality.is_repeatable(),
            field.cardinality.is_optional(),
        )
    }

    /// Apply the array wrapper, then the nullable wrapper
    pub fn wrap(&self, mapped: Value, repeatable: bool, nullable: bool) -> Value {
        let mapped = if repeatable {
            self.array_of(mapped)
        } else {
            mapped
        };
        if nullable {
            self.nullable(mapped)
        } else {
            mapped
        }
    }

    /// Array construct of the vocabulary
    pub fn array_of(&self, items: Value) -> Value {
        json!({ "type": "array", "items": items })
    }

    /// Nullable construct of the vocabulary.
    ///
    /// Avro uses a union with `null` first; JSON Schema widens `type` or
    /// falls back to `anyOf` for references.
    pub fn nullable(&self, mapped: Value) -> Value {
        match self.vocabulary {
            TargetVocabulary::Avro => match mapped {
                Value::Array(mut members) => {
                    if !members.iter().any(|m| m == "null") {
                        members.insert(0, json!("null"));
                    }
                    Value::Array(members)
                }
                other => json!(["null", other]),
            },
            TargetVocabulary::JsonSchema => {
                let mut mapped = mapped;
                match mapped.get("type").cloned() {
                    Some(Value::String(single)) => {
                        mapped["type"] = json!([single, "null"]);
                        mapped
                    }
                    Some(Value::Array(mut types)) => {
                        if !types.iter().any(|t| t == "null") {
                            types.push(json!("null"));
                        }
                        mapped["type"] = Value::Array(types);
                        mapped
                    }
                    _ => json!({ "anyOf": [mapped, { "type": "null" }] }),
                }
            }
        }
    }

    /// Reference to a named type in the target
    pub fn reference(&self, name: &str) -> Value {
        match self.vocabulary {
            TargetVocabulary::Avro => json!(name),
            TargetVocabulary::JsonSchema => json!({ "$ref": format!("#/definitions/{name}") }),
        }
    }

    /// Target primitive for a type name, following named simple-type bases
    pub fn resolve_primitive(&self, type_name: &str) -> &'static str {
        let mut current = normalize_type(type_name);
        // A base chain longer than the number of simple types is a cycle
        for _ in 0..=self.registry.simple_types().len() {
            match self.registry.simple_type(&current) {
                Some(simple) if !simple.base.is_empty() => current = simple.base.clone(),
                Some(_) => return FALLBACK_TYPE,
                None => return self.vocabulary.map_primitive(&current),
            }
        }
        FALLBACK_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::{Cardinality, MaxOccurs};
    use catalog_schema::XsdLoader;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Party">
    <xs:sequence>
      <xs:element name="Nm" type="Max35Text"/>
    </xs:sequence>
  </xs:complexType>
  <xs:simpleType name="Max35Text">
    <xs:restriction base="xs:string">
      <xs:maxLength value="35"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="Amount">
    <xs:restriction base="DecimalNumber"/>
  </xs:simpleType>
  <xs:simpleType name="DecimalNumber">
    <xs:restriction base="xs:decimal"/>
  </xs:simpleType>
</xs:schema>"#;

    fn registry() -> TypeRegistry {
        XsdLoader::new().load_from_str(SCHEMA).unwrap()
    }

    #[test]
    fn test_complex_type_maps_to_reference() {
        let registry = registry();

        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(avro.map_type("Party"), json!("Party"));

        let json_schema = TypeMapper::new(&registry, TargetVocabulary::JsonSchema);
        assert_eq!(
            json_schema.map_type("tns:Party"),
            json!({ "$ref": "#/definitions/Party" })
        );
    }

    #[test]
    fn test_simple_type_resolution() {
        let registry = registry();

        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(avro.map_type("Max35Text"), json!("string"));
        assert_eq!(avro.map_type("Amount"), json!("double"));

        let json_schema = TypeMapper::new(&registry, TargetVocabulary::JsonSchema);
        assert_eq!(
            json_schema.map_type("Max35Text"),
            json!({ "$ref": "#/definitions/Max35Text" })
        );
        assert_eq!(json_schema.map_type("xs:int"), json!({ "type": "integer" }));
        assert_eq!(json_schema.resolve_primitive("Amount"), "number");
    }

    #[test]
    fn test_mandatory_repeated_string_has_no_null_wrapper() {
        let registry = registry();
        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        let field = Field::new("Ustrd", "RmtInf/Ustrd", "string", Cardinality::new(1, MaxOccurs::Unbounded));

        assert_eq!(avro.map_field(&field), json!({ "type": "array", "items": "string" }));
    }

    #[test]
    fn test_optional_field_wrapping() {
        let registry = registry();
        let field = Field::new("Nm", "Pty/Nm", "Max35Text", Cardinality::optional());

        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(avro.map_field(&field), json!(["null", "string"]));

        let json_schema = TypeMapper::new(&registry, TargetVocabulary::JsonSchema);
        assert_eq!(
            json_schema.map_field(&field),
            json!({ "anyOf": [{ "$ref": "#/definitions/Max35Text" }, { "type": "null" }] })
        );

        let plain = Field::new("Flag", "Flag", "boolean", Cardinality::optional());
        assert_eq!(json_schema.map_field(&plain), json!({ "type": ["boolean", "null"] }));
    }

    #[test]
    fn test_optional_repeated_field() {
        let registry = registry();
        let field = Field::new("Pty", "Pty", "Party", Cardinality::new(0, MaxOccurs::Bounded(3)));

        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(
            avro.map_field(&field),
            json!(["null", { "type": "array", "items": "Party" }])
        );

        let json_schema = TypeMapper::new(&registry, TargetVocabulary::JsonSchema);
        assert_eq!(
            json_schema.map_field(&field),
            json!({ "type": ["array", "null"], "items": { "$ref": "#/definitions/Party" } })
        );
    }

    #[test]
    fn test_nullable_union_not_doubled() {
        let registry = registry();
        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(avro.nullable(json!(["null", "long"])), json!(["null", "long"]));
        assert_eq!(avro.nullable(json!(["long", "string"])), json!(["null", "long", "string"]));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let registry = registry();
        let avro = TypeMapper::new(&registry, TargetVocabulary::Avro);
        assert_eq!(avro.map_type("ISODateTime"), json!("string"));
        assert_eq!(avro.map_type("anyType"), json!("string"));
    }
}
