#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-export
//!
//! Writers that render a flattened field catalog for people and tools.
//!
//! Three formats are supported:
//! - CSV with `#` metadata lines ahead of the header row
//! - JSON holding `metadata` and `fields`
//! - Markdown with a metadata list and separate mandatory/optional tables
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_export::{ExportFormat, render};
//! use catalog_model::{Cardinality, CatalogMetadata, Field};
//!
//! let fields = vec![Field::new("MsgId", "GrpHdr/MsgId", "Max35Text", Cardinality::required())];
//! let metadata = CatalogMetadata::new("pain.001.001.09", &fields);
//!
//! let csv = render(ExportFormat::Csv, &fields, &metadata).unwrap();
//! assert!(csv.starts_with("# Message Type: pain.001.001.09"));
//! ```

pub mod csv_writer;
pub mod format;
pub mod json_writer;
pub mod markdown_writer;
pub mod summary;

pub use csv_writer::CsvCatalogWriter;
pub use format::{CatalogWriter, ExportFormat, export, render, writer_for};
pub use json_writer::JsonCatalogWriter;
pub use markdown_writer::MarkdownCatalogWriter;
pub use summary::{brief_constraints, describe_constraints};

use thiserror::Error;

/// Errors that can occur while exporting a catalog
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported export format '{found}'. Supported: {supported}")]
    UnsupportedFormat { found: String, supported: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
