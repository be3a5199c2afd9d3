#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # catalog-assist
//!
//! Optional language-model assistant. Nothing in the catalog pipeline
//! depends on it: conversion, comparison and validation all complete
//! without it, and every failure here degrades to the unassisted result.
//!
//! The model is reached through the [`CompletionClient`] trait. With the
//! `http` feature, [`HttpCompletionClient`] talks to OpenAI-compatible and
//! Anthropic endpoints; tests plug in canned clients.
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_assist::{CompletionClient, SchemaAssistant};
//!
//! struct Canned;
//!
//! impl CompletionClient for Canned {
//!     fn complete(&self, _system: &str, _user: &str) -> catalog_assist::Result<String> {
//!         Ok("Use logical types for dates.\n\nKeep enum symbols upper case.".to_string())
//!     }
//! }
//!
//! let assistant = SchemaAssistant::new(Canned);
//! let summary = serde_json::json!({ "complexTypes": ["GroupHeader85"] });
//! let tips = assistant
//!     .suggest(&summary, catalog_mapping::TargetVocabulary::Avro)
//!     .unwrap();
//! assert_eq!(tips.len(), 2);
//! ```

pub mod assistant;
pub mod client;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
pub mod response;

pub use assistant::{SchemaAssistant, looks_like_schema, summarize_registry};
pub use client::CompletionClient;
pub use config::{AssistConfig, Provider};
#[cfg(feature = "http")]
pub use http::HttpCompletionClient;
pub use response::{extract_candidates, extract_json};

use thiserror::Error;

/// Errors raised by the assistant; callers treat all of them as non-fatal
#[derive(Error, Debug)]
pub enum AssistError {
    /// Provider or credentials missing or invalid
    #[error("Assistant configuration error: {0}")]
    Configuration(String),

    /// Transport or HTTP status failure
    #[error("Assistant request failed: {0}")]
    Request(String),

    /// The model answered, but not with what was asked for
    #[error("Invalid assistant response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, AssistError>;
