//! Command handlers

mod analyze;
mod compare;
mod convert;
mod validate;

pub use analyze::{AnalyzeArgs, handle_analyze};
pub use compare::{CompareArgs, handle_compare};
pub use convert::{ConvertArgs, handle_convert};
pub use validate::{ValidateArgs, handle_validate};

use std::path::Path;

use anyhow::Context;
use catalog_assist::{HttpCompletionClient, SchemaAssistant};
use catalog_schema::SchemaDocument;

use crate::config::CliConfig;

fn load_schema(path: &Path) -> anyhow::Result<SchemaDocument> {
    SchemaDocument::load(path).with_context(|| format!("Failed to load schema {}", path.display()))
}

/// The assistant, or `None` with an advisory note when it cannot be set up
fn try_assistant(config: &CliConfig, purpose: &str) -> Option<SchemaAssistant<HttpCompletionClient>> {
    let client = config
        .assist_config()
        .and_then(HttpCompletionClient::new);
    match client {
        Ok(client) => Some(SchemaAssistant::new(client)),
        Err(err) => {
            eprintln!("note: {purpose} skipped: {err}");
            None
        }
    }
}
