#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-model
//!
//! Format-neutral field catalog model shared by the schema loaders, the
//! type mapper, the matcher and the writers.
//!
//! A [`Field`] is one flattened entry of a schema tree: its leaf name, the
//! hierarchical path that leads to it, its occurrence bounds and the
//! validation facets collected from the schema.

/// Field record, occurrence bounds and requirement classification.
pub mod field;
/// Validation facets attached to a field.
pub mod constraints;
/// Type-name, path and leaf-name normalizers.
pub mod normalize;
/// Catalog statistics and writer metadata.
pub mod stats;

pub use constraints::Constraints;
pub use field::{Cardinality, Field, MaxOccurs, Requirement};
pub use normalize::{canonical_path, join_path, normalize_name, normalize_type, path_segments};
pub use stats::{CatalogMetadata, CatalogStats};

use thiserror::Error;

/// Errors that can occur when working with catalog model values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid occurrence bound '{value}': {reason}")]
    InvalidOccurs { value: String, reason: String },

    #[error("Invalid multiplicity '{0}', expected '<min>..<max>'")]
    InvalidMultiplicity(String),
}

impl Error {
    /// Build an invalid-occurrence error with the offending text.
    pub fn invalid_occurs(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOccurs {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
