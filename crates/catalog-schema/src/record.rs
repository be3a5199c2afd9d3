//! Record-schema (Avro) loader
//!
//! A record schema is self-contained: nested records, enums and fixed types
//! are declared in place, so no separate registry is built. The flattener
//! discovers named declarations while it walks the document.

use crate::{Error, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, trace};

/// A parsed record schema rooted at a record declaration
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: String,
    pub namespace: Option<String>,
    root: Value,
}

impl RecordSchema {
    /// The root record declaration
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Field declarations of the root record
    pub fn fields(&self) -> &[Value] {
        self.root
            .get("fields")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The root record name, or `unknown`
    pub fn message_identifier(&self) -> String {
        if self.name.is_empty() {
            "unknown".to_string()
        } else {
            self.name.clone()
        }
    }
}

/// Loads `.avsc` documents
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordLoader;

impl RecordLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a schema from a file path
    pub fn load_from_file(&self, path: &Path) -> Result<RecordSchema> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        trace!("Loading record schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        self.load_from_str(&content)
    }

    /// Load a schema from JSON text
    pub fn load_from_str(&self, json: &str) -> Result<RecordSchema> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("JSON parse error: {}", e)))?;

        let is_record = root.get("type").and_then(Value::as_str) == Some("record");
        if !is_record {
            return Err(Error::Parse(
                "root declaration is not a record".to_string(),
            ));
        }
        if root.get("fields").is_some_and(|f| !f.is_array()) {
            return Err(Error::Parse("root record 'fields' is not an array".to_string()));
        }

        let schema = RecordSchema {
            name: root
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            namespace: root
                .get("namespace")
                .and_then(Value::as_str)
                .map(str::to_string),
            root,
        };

        info!(
            name = %schema.name,
            fields = schema.fields().len(),
            "Loaded record schema"
        );

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_record() {
        let schema = RecordLoader::new()
            .load_from_str(
                r#"{"type":"record","name":"Pain001","namespace":"com.bank","fields":[
                    {"name":"MsgId","type":"string"}
                ]}"#,
            )
            .unwrap();

        assert_eq!(schema.name, "Pain001");
        assert_eq!(schema.namespace.as_deref(), Some("com.bank"));
        assert_eq!(schema.fields().len(), 1);
        assert_eq!(schema.message_identifier(), "Pain001");
    }

    #[test]
    fn test_unnamed_record_identifier() {
        let schema = RecordLoader::new()
            .load_from_str(r#"{"type":"record","fields":[]}"#)
            .unwrap();
        assert_eq!(schema.message_identifier(), "unknown");
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = RecordLoader::new().load_from_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_non_record_root_is_parse_error() {
        let err = RecordLoader::new()
            .load_from_str(r#"{"type":"enum","name":"E","symbols":["A"]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = RecordLoader::new()
            .load_from_str(r#"{"type":"record","name":"R","fields":{}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = RecordLoader::new()
            .load_from_file(Path::new("/nonexistent/schema.avsc"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
