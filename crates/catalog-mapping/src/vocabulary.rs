//! Target type vocabularies
//!
//! Each vocabulary is a fixed table from tree-schema primitive names to the
//! target's primitive names. Anything the table does not know maps to
//! `string`.

use crate::{Error, Result};
use catalog_model::normalize_type;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback primitive shared by both vocabularies
pub const FALLBACK_TYPE: &str = "string";

/// Output schema representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetVocabulary {
    /// JSON Schema (draft 2020-12)
    JsonSchema,
    /// Avro record schema
    Avro,
}

impl TargetVocabulary {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetVocabulary::JsonSchema => "json",
            TargetVocabulary::Avro => "avro",
        }
    }

    /// Target primitive for a source primitive; unknown names fall back to `string`
    pub fn map_primitive(&self, source: &str) -> &'static str {
        let local = normalize_type(source);
        let mapped = match self {
            TargetVocabulary::JsonSchema => json_schema_primitive(&local),
            TargetVocabulary::Avro => avro_primitive(&local),
        };
        mapped.unwrap_or(FALLBACK_TYPE)
    }

    /// Whether `source` is a primitive this vocabulary maps explicitly
    pub fn is_known_primitive(&self, source: &str) -> bool {
        let local = normalize_type(source);
        match self {
            TargetVocabulary::JsonSchema => json_schema_primitive(&local).is_some(),
            TargetVocabulary::Avro => avro_primitive(&local).is_some(),
        }
    }

    /// Representative source primitive for a target primitive.
    ///
    /// `string` maps back to `string`; unknown target names also yield `string`.
    pub fn reverse_primitive(&self, target: &str) -> &'static str {
        match (self, target) {
            (_, "boolean") => "boolean",
            (TargetVocabulary::JsonSchema, "integer") => "integer",
            (TargetVocabulary::JsonSchema, "number") => "decimal",
            (TargetVocabulary::Avro, "int") => "int",
            (TargetVocabulary::Avro, "long") => "long",
            (TargetVocabulary::Avro, "float") => "float",
            (TargetVocabulary::Avro, "double") => "double",
            (TargetVocabulary::Avro, "bytes") => "base64Binary",
            _ => FALLBACK_TYPE,
        }
    }

    /// Whether optional fields need an explicit `null` default
    pub fn requires_null_default(&self) -> bool {
        matches!(self, TargetVocabulary::Avro)
    }
}

fn json_schema_primitive(local: &str) -> Option<&'static str> {
    let mapped = match local {
        "string" | "normalizedString" | "token" => "string",
        "int" | "integer" | "positiveInteger" | "negativeInteger" | "nonNegativeInteger"
        | "nonPositiveInteger" | "long" | "short" | "byte" | "unsignedLong" | "unsignedInt"
        | "unsignedShort" | "unsignedByte" => "integer",
        "decimal" | "float" | "double" => "number",
        "boolean" => "boolean",
        "date" | "time" | "dateTime" | "duration" => "string",
        "base64Binary" | "hexBinary" | "anyURI" => "string",
        _ => return None,
    };
    Some(mapped)
}

fn avro_primitive(local: &str) -> Option<&'static str> {
    let mapped = match local {
        "string" | "normalizedString" | "token" => "string",
        "int" | "short" | "byte" | "unsignedShort" | "unsignedByte" => "int",
        "integer" | "positiveInteger" | "negativeInteger" | "nonNegativeInteger"
        | "nonPositiveInteger" | "long" | "unsignedLong" | "unsignedInt" => "long",
        "decimal" | "double" => "double",
        "float" => "float",
        "boolean" => "boolean",
        "date" | "time" | "dateTime" | "duration" | "anyURI" => "string",
        "base64Binary" | "hexBinary" => "bytes",
        _ => return None,
    };
    Some(mapped)
}

impl FromStr for TargetVocabulary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "json-schema" | "jsonschema" => Ok(TargetVocabulary::JsonSchema),
            "avro" | "avsc" => Ok(TargetVocabulary::Avro),
            _ => Err(Error::UnsupportedTarget {
                found: s.to_string(),
                supported: "json, avro".to_string(),
            }),
        }
    }
}

impl fmt::Display for TargetVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
