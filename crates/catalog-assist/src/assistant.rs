//! Schema assistant: suggestions, conversion review and semantic ranking

use catalog_mapping::{RankError, RankedCandidate, SemanticRanker, TargetVocabulary};
use catalog_model::Field;
use catalog_schema::TypeRegistry;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::client::CompletionClient;
use crate::response::{extract_candidates, extract_json};
use crate::{AssistError, Result};

const SCHEMA_EXPERT: &str = "You are an expert in payment message schemas, XML Schema, \
JSON Schema and Avro. Answer precisely and keep to the requested output form.";

const RANKING_INSTRUCTIONS: &str = "You map fields between two schemas of the same \
payment message by business meaning rather than spelling. Abbreviated and expanded \
names, or differently cased names, can denote the same element when their position \
in the hierarchy agrees.

Reply with a JSON array only. Each entry has the keys source_path, target_path, \
confidence (0.0 to 1.0) and justification. Use the paths exactly as listed. Leave out \
pairs below 0.7 confidence; reply [] when nothing matches.";

/// Summary of a tree schema handed to the model as context
pub fn summarize_registry(registry: &TypeRegistry) -> Value {
    json!({
        "targetNamespace": registry.target_namespace.as_deref().unwrap_or_default(),
        "elements": registry.elements().iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        "complexTypes": registry
            .complex_types()
            .iter()
            .map(|t| json!({
                "name": t.name,
                "elements": t.elements.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
                "attributes": t.attributes.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>(),
        "simpleTypes": registry
            .simple_types()
            .iter()
            .map(|t| json!({ "name": t.name, "base": t.base }))
            .collect::<Vec<_>>(),
    })
}

/// Whether a value has the outline of a schema in the target vocabulary
pub fn looks_like_schema(value: &Value, target: TargetVocabulary) -> bool {
    match target {
        TargetVocabulary::Avro => match value {
            Value::Object(map) => map.contains_key("type"),
            Value::Array(items) => {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|item| item.as_object().is_some_and(|m| m.contains_key("type")))
            }
            _ => false,
        },
        TargetVocabulary::JsonSchema => value.as_object().is_some_and(|map| {
            ["$schema", "type", "properties", "definitions", "$ref"]
                .iter()
                .any(|key| map.contains_key(*key))
        }),
    }
}

/// Language-model helper built on a [`CompletionClient`]
pub struct SchemaAssistant<C> {
    client: C,
}

impl<C: CompletionClient> SchemaAssistant<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Advisory suggestions for converting a schema, one per line
    pub fn suggest(&self, summary: &Value, target: TargetVocabulary) -> Result<Vec<String>> {
        let prompt = format!(
            "A schema is about to be converted to {target}. Its outline:\n\n{}\n\n\
             List the points to watch: type mappings that lose information, optionality \
             and repetition, naming of records and fields, and constraints the target \
             cannot express. One point per line.",
            pretty(summary)
        );

        let reply = self.client.complete(SCHEMA_EXPERT, &prompt)?;
        let lines: Vec<String> = reply
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        info!(count = lines.len(), client = self.client.name(), "Received suggestions");
        Ok(lines)
    }

    /// Ask the model to review a converted schema.
    ///
    /// Fails when the reply carries no JSON or the JSON is not a schema for `target`.
    pub fn try_enhance(
        &self,
        summary: &Value,
        target: TargetVocabulary,
        converted: &Value,
    ) -> Result<Value> {
        let prompt = format!(
            "Source schema outline:\n\n{}\n\nIts {target} conversion:\n\n{}\n\n\
             Return an improved {target} schema that keeps every field, uses the most \
             precise types available and adds descriptions where the source documents \
             them. Reply with the schema JSON only.",
            pretty(summary),
            pretty(converted)
        );

        let reply = self.client.complete(SCHEMA_EXPERT, &prompt)?;
        let candidate = extract_json(&reply).ok_or_else(|| {
            AssistError::InvalidResponse("reply contains no JSON document".to_string())
        })?;

        if !looks_like_schema(&candidate, target) {
            return Err(AssistError::InvalidResponse(format!(
                "reply is not a {target} schema"
            )));
        }
        Ok(candidate)
    }

    /// Reviewed schema, or `converted` unchanged when the review fails
    pub fn enhance(&self, summary: &Value, target: TargetVocabulary, converted: &Value) -> Value {
        match self.try_enhance(summary, target, converted) {
            Ok(enhanced) => {
                info!(vocabulary = %target, "Applied assistant review to converted schema");
                enhanced
            }
            Err(e) => {
                warn!("Keeping unreviewed schema: {}", e);
                converted.clone()
            }
        }
    }

    /// Propose semantic pairings between a batch of sources and all targets
    pub fn rank_matches(
        &self,
        sources: &[&Field],
        targets: &[&Field],
    ) -> Result<Vec<RankedCandidate>> {
        let prompt = format!(
            "Source fields:\n{}\nTarget fields:\n{}\nReturn the JSON array of matches.",
            field_listing(sources),
            field_listing(targets)
        );

        let reply = self.client.complete(RANKING_INSTRUCTIONS, &prompt)?;
        let candidates = extract_candidates(&reply)?;
        debug!(
            sources = sources.len(),
            candidates = candidates.len(),
            "Ranked semantic candidates"
        );
        Ok(candidates)
    }
}

impl<C: CompletionClient> SemanticRanker for SchemaAssistant<C> {
    fn rank(
        &self,
        sources: &[&Field],
        targets: &[&Field],
    ) -> std::result::Result<Vec<RankedCandidate>, RankError> {
        self.rank_matches(sources, targets)
            .map_err(|e| RankError(e.to_string()))
    }
}

fn field_listing(fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|f| {
            format!(
                "- {} | path: {} | type: {} | {}\n",
                f.name, f.path, f.data_type, f.requirement
            )
        })
        .collect()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
