#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-validation
//!
//! Validates message instances against a flattened field catalog.
//!
//! Every mandatory field must be present under each existing instance of
//! its parent, and every leaf value is re-checked against the field's
//! length, pattern, digit and code-list constraints.
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_model::{Cardinality, Field};
//! use catalog_validation::MessageValidator;
//!
//! let fields = vec![Field::new("MsgId", "GrpHdr/MsgId", "string", Cardinality::required())
//!     .with_parent_path("GrpHdr")];
//! let validator = MessageValidator::new(&fields);
//!
//! let result = validator
//!     .validate("<Document><GrpHdr><MsgId>ABC</MsgId></GrpHdr></Document>")
//!     .unwrap();
//! assert!(result.is_valid);
//! ```

pub mod engine;
pub mod locate;
pub mod rules;

pub use engine::{
    MessageValidator, Severity, ValidationConfig, ValidationError, ValidationResult, ViolationKind,
};
pub use rules::{
    RuleResult, compile_pattern, validate_bounds, validate_code_list, validate_digits,
    validate_length, validate_pattern,
};

use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Message file not found: {0}")]
    NotFound(String),

    #[error("Message parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
