//! Catalog statistics and writer metadata

use crate::field::Field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Aggregate counts over a flattened field list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_fields: usize,
    pub mandatory_count: usize,
    pub optional_count: usize,
    pub conditional_count: usize,
    pub fields_with_code_lists: usize,
    pub fields_with_patterns: usize,
    pub fields_with_length: usize,
    pub fields_with_digits: usize,
    /// Field count per `min..max` multiplicity
    pub multiplicity: BTreeMap<String, usize>,
    /// Field count per path depth
    pub depth_distribution: BTreeMap<usize, usize>,
    pub max_depth: usize,
    pub unique_names: usize,
    pub unique_paths: usize,
}

impl CatalogStats {
    /// Compute statistics in one pass over the fields
    pub fn from_fields(fields: &[Field]) -> Self {
        let mut stats = Self {
            total_fields: fields.len(),
            ..Default::default()
        };
        let mut names = HashSet::new();
        let mut paths = HashSet::new();

        for field in fields {
            if field.is_mandatory() {
                stats.mandatory_count += 1;
            } else if field.is_optional() {
                stats.optional_count += 1;
            } else {
                stats.conditional_count += 1;
            }

            if field.code_list.is_some() {
                stats.fields_with_code_lists += 1;
            }
            if field.constraints.pattern.is_some() {
                stats.fields_with_patterns += 1;
            }
            if field.constraints.has_length() {
                stats.fields_with_length += 1;
            }
            if field.constraints.has_digits() {
                stats.fields_with_digits += 1;
            }

            *stats.multiplicity.entry(field.multiplicity()).or_default() += 1;

            let depth = field.depth();
            *stats.depth_distribution.entry(depth).or_default() += 1;
            stats.max_depth = stats.max_depth.max(depth);

            names.insert(field.name.as_str());
            paths.insert(field.path.as_str());
        }

        stats.unique_names = names.len();
        stats.unique_paths = paths.len();
        stats
    }
}

/// Header block handed to catalog writers alongside the field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    pub message_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_format: Option<String>,

    pub total_fields: usize,
    pub mandatory_count: usize,
    pub optional_count: usize,
    pub conditional_count: usize,
    pub extraction_date: DateTime<Utc>,
}

impl CatalogMetadata {
    /// Build metadata for `fields`, stamped with the current UTC time
    pub fn new(message_type: impl Into<String>, fields: &[Field]) -> Self {
        Self::at(message_type, fields, Utc::now())
    }

    /// Build metadata with an explicit extraction timestamp
    pub fn at(message_type: impl Into<String>, fields: &[Field], extraction_date: DateTime<Utc>) -> Self {
        let stats = CatalogStats::from_fields(fields);
        Self {
            message_type: message_type.into(),
            schema_format: None,
            total_fields: stats.total_fields,
            mandatory_count: stats.mandatory_count,
            optional_count: stats.optional_count,
            conditional_count: stats.conditional_count,
            extraction_date,
        }
    }

    #[must_use]
    pub fn with_schema_format(mut self, format: impl Into<String>) -> Self {
        self.schema_format = Some(format.into());
        self
    }

    /// Timestamp rendered as RFC 3339 with a `Z` suffix
    pub fn extraction_date_string(&self) -> String {
        self.extraction_date
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }
}
