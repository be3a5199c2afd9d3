#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-mapping
//!
//! Bridges between schema representations.
//!
//! - [`TypeMapper`] maps tree-schema primitives and named types into a
//!   [`TargetVocabulary`], wrapping repeated fields in arrays and optional
//!   fields in nullable constructs.
//! - [`SchemaConverter`] walks a whole [`catalog_schema::TypeRegistry`] and
//!   emits an Avro record set or a JSON Schema document.
//! - [`FieldMatcher`] pairs two flattened field lists one-to-one, optionally
//!   consulting a [`SemanticRanker`].

pub mod vocabulary;
pub mod mapper;
pub mod converter;
pub mod strategy;
pub mod matcher;

pub use converter::{ConvertedSchema, DEFAULT_NAMESPACE, SchemaConverter};
pub use mapper::TypeMapper;
pub use matcher::{
    FieldMatch, FieldMatcher, MatchReport, MatchStrategy, MatchSummary, MatcherConfig, match_fields,
};
pub use strategy::{RankError, RankedCandidate, SemanticRanker};
pub use vocabulary::TargetVocabulary;

use thiserror::Error;

/// Errors that can occur during mapping
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported target '{found}'. Supported: {supported}")]
    UnsupportedTarget { found: String, supported: String },
}

pub type Result<T> = std::result::Result<T, Error>;
