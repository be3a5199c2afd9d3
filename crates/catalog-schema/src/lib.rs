#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-schema
//!
//! Schema loaders and the field flattener.
//!
//! Two input formats are supported:
//! - tree schemas (XML Schema documents), loaded into a [`TypeRegistry`]
//! - record schemas (Avro `.avsc` documents), kept as the parsed JSON tree
//!
//! [`SchemaDocument`] picks the loader from the file extension and exposes
//! one `flatten` contract over both.

pub mod xml;
pub mod model;
pub mod xsd;
pub mod record;
pub mod extract;
pub mod flatten;
pub mod document;
pub mod catalog;

pub use catalog::Catalog;
pub use document::{SchemaDocument, SchemaFormat};
pub use model::{AttributeSpec, ComplexType, ElementSpec, Facets, InlineType, SimpleType, TypeRegistry};
pub use record::{RecordLoader, RecordSchema};
pub use xml::{XmlError, XmlNode};
pub use xsd::XsdLoader;

use thiserror::Error;

/// Conventional name of the tree-schema root element
pub const ROOT_ELEMENT: &str = "Document";

/// Errors that can occur when loading schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema file not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported schema format '{found}'. Supported: {supported}")]
    UnsupportedFormat { found: String, supported: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
