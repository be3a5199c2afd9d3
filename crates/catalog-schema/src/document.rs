//! Loader selection over the two schema forms

use crate::flatten::{RECORD_SEPARATOR, TREE_SEPARATOR, flatten_record, flatten_tree};
use crate::model::TypeRegistry;
use crate::record::{RecordLoader, RecordSchema};
use crate::xsd::{XsdLoader, message_identifier};
use crate::{Error, ROOT_ELEMENT, Result};
use catalog_model::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Extensions accepted by [`SchemaFormat::from_path`]
pub const SUPPORTED_EXTENSIONS: &str = ".xsd, .avsc, .avro";

/// Input schema form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// XML Schema tree
    Xsd,
    /// Avro record schema
    Avro,
}

impl SchemaFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xsd" => Ok(SchemaFormat::Xsd),
            "avsc" | "avro" => Ok(SchemaFormat::Avro),
            "" => Err(Error::UnsupportedFormat {
                found: path.display().to_string(),
                supported: SUPPORTED_EXTENSIONS.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                found: format!(".{extension}"),
                supported: SUPPORTED_EXTENSIONS.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaFormat::Xsd => "xsd",
            SchemaFormat::Avro => "avro",
        }
    }

    /// Path separator used by fields of this format
    pub fn separator(&self) -> char {
        match self {
            SchemaFormat::Xsd => TREE_SEPARATOR,
            SchemaFormat::Avro => RECORD_SEPARATOR,
        }
    }
}

impl FromStr for SchemaFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "xsd" | "xml" => Ok(SchemaFormat::Xsd),
            "avro" | "avsc" => Ok(SchemaFormat::Avro),
            _ => Err(Error::UnsupportedFormat {
                found: s.to_string(),
                supported: "xsd, avro".to_string(),
            }),
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded schema of either form
#[derive(Debug, Clone)]
pub enum SchemaDocument {
    Tree(TypeRegistry),
    Record(RecordSchema),
}

impl SchemaDocument {
    /// Load a schema, choosing the loader from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SchemaFormat::from_path(path)?;
        Self::load_as(path, format)
    }

    /// Load a schema with an explicit format
    pub fn load_as(path: impl AsRef<Path>, format: SchemaFormat) -> Result<Self> {
        let path = path.as_ref();
        let document = match format {
            SchemaFormat::Xsd => SchemaDocument::Tree(XsdLoader::new().load_from_file(path)?),
            SchemaFormat::Avro => SchemaDocument::Record(RecordLoader::new().load_from_file(path)?),
        };
        info!(
            path = %path.display(),
            format = %format,
            message_type = %document.message_identifier(),
            "Schema loaded"
        );
        Ok(document)
    }

    /// Parse schema text of the given format
    pub fn parse(content: &str, format: SchemaFormat) -> Result<Self> {
        Ok(match format {
            SchemaFormat::Xsd => SchemaDocument::Tree(XsdLoader::new().load_from_str(content)?),
            SchemaFormat::Avro => SchemaDocument::Record(RecordLoader::new().load_from_str(content)?),
        })
    }

    pub fn format(&self) -> SchemaFormat {
        match self {
            SchemaDocument::Tree(_) => SchemaFormat::Xsd,
            SchemaDocument::Record(_) => SchemaFormat::Avro,
        }
    }

    /// Message identifier: from the target namespace, or the root record name
    pub fn message_identifier(&self) -> String {
        match self {
            SchemaDocument::Tree(registry) => {
                message_identifier(registry.target_namespace.as_deref())
            }
            SchemaDocument::Record(schema) => schema.message_identifier(),
        }
    }

    /// Flatten from the conventional root
    pub fn flatten(&self) -> Vec<Field> {
        self.flatten_from(ROOT_ELEMENT)
    }

    /// Flatten from a named root element; record schemas always start at their root record
    pub fn flatten_from(&self, root_element: &str) -> Vec<Field> {
        match self {
            SchemaDocument::Tree(registry) => flatten_tree(registry, root_element),
            SchemaDocument::Record(schema) => flatten_record(schema),
        }
    }

    /// The type registry when this is a tree schema
    pub fn as_tree(&self) -> Option<&TypeRegistry> {
        match self {
            SchemaDocument::Tree(registry) => Some(registry),
            SchemaDocument::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            SchemaDocument::Tree(_) => None,
            SchemaDocument::Record(schema) => Some(schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SchemaFormat::from_path(Path::new("a.xsd")).unwrap(), SchemaFormat::Xsd);
        assert_eq!(SchemaFormat::from_path(Path::new("a.XSD")).unwrap(), SchemaFormat::Xsd);
        assert_eq!(SchemaFormat::from_path(Path::new("a.avsc")).unwrap(), SchemaFormat::Avro);
        assert_eq!(SchemaFormat::from_path(Path::new("a.avro")).unwrap(), SchemaFormat::Avro);
    }

    #[test]
    fn test_unsupported_extension_lists_supported() {
        let err = SchemaFormat::from_path(Path::new("a.json")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(".json"));
        assert!(message.contains(".xsd, .avsc, .avro"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("xsd".parse::<SchemaFormat>().unwrap(), SchemaFormat::Xsd);
        assert_eq!(".avsc".parse::<SchemaFormat>().unwrap(), SchemaFormat::Avro);
        assert!("yaml".parse::<SchemaFormat>().is_err());
    }

    #[test]
    fn test_unsupported_extension_checked_before_existence() {
        let err = SchemaDocument::load("/nonexistent/schema.txt").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));

        let err = SchemaDocument::load("/nonexistent/schema.xsd").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_parse_dispatch() {
        let doc = SchemaDocument::parse(
            r#"{"type":"record","name":"Msg","fields":[{"name":"A","type":"string"}]}"#,
            SchemaFormat::Avro,
        )
        .unwrap();
        assert_eq!(doc.format(), SchemaFormat::Avro);
        assert_eq!(doc.message_identifier(), "Msg");
        assert!(doc.as_tree().is_none());
        assert_eq!(doc.flatten().len(), 1);
    }
}
