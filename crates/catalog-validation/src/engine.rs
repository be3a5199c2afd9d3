//! Message validation engine

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use catalog_model::{Field, path_segments};
use catalog_schema::XmlNode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::locate::{find_elements, find_values, has_member};
use crate::rules::{
    RuleResult, compile_pattern, validate_bounds, validate_code_list, validate_digits,
    validate_length, validate_pattern,
};
use crate::{Error, Result};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Report mandatory fields missing under an existing parent
    pub check_mandatory: bool,
    /// Re-check leaf values against field constraints
    pub check_constraints: bool,
    /// Stop collecting errors after this many (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_mandatory: true,
            check_constraints: true,
            max_errors: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Which check produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    MissingMandatory,
    Length,
    Pattern,
    CodeList,
    Digits,
    Bounds,
    /// The field's pattern could not be compiled, so it was not checked
    InvalidPattern,
}

/// One finding, located by its instance path in the message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub path: String,
    pub field: String,
    pub severity: Severity,
    pub kind: ViolationKind,
}

impl ValidationError {
    pub fn new(
        kind: ViolationKind,
        field: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            field: field.into(),
            severity: Severity::Error,
            kind,
        }
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.path)
    }
}

/// Result of validating one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning.with_severity(Severity::Warning));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Errors produced by one kind of check
    pub fn errors_of(&self, kind: ViolationKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates message instances against a field catalog.
///
/// Patterns are compiled once up front. A pattern the regex engine rejects
/// is reported as a warning on every validation and never fails a message.
pub struct MessageValidator<'f> {
    fields: &'f [Field],
    config: ValidationConfig,
    patterns: HashMap<usize, Option<Regex>>,
}

impl<'f> MessageValidator<'f> {
    pub fn new(fields: &'f [Field]) -> Self {
        let patterns = fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| {
                let pattern = field.constraints.pattern.as_deref()?;
                let compiled = match compile_pattern(pattern) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        warn!(
                            "Skipping pattern '{}' of field {}: {}",
                            pattern, field.path, e
                        );
                        None
                    }
                };
                Some((index, compiled))
            })
            .collect();

        Self {
            fields,
            config: ValidationConfig::default(),
            patterns,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a message held in memory
    pub fn validate(&self, xml: &str) -> Result<ValidationResult> {
        let root = XmlNode::parse(xml).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(self.validate_document(&root))
    }

    /// Read and validate a message file
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidationResult> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        self.validate(&content)
    }

    /// Validate an already parsed message, rooted at its document element
    pub fn validate_document(&self, root: &XmlNode) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (index, field) in self.fields.iter().enumerate() {
            if self.limit_reached(&result) {
                debug!("Error limit {} reached", self.config.max_errors);
                break;
            }
            if self.config.check_mandatory && field.is_mandatory() {
                self.check_presence(root, field, &mut result);
            }
            if self.config.check_constraints {
                self.check_values(root, index, field, &mut result);
            }
        }

        if self.config.max_errors > 0 {
            result.errors.truncate(self.config.max_errors);
        }

        info!(
            "Validated message against {} fields: {} errors, {} warnings",
            self.fields.len(),
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    fn limit_reached(&self, result: &ValidationResult) -> bool {
        self.config.max_errors > 0 && result.errors.len() >= self.config.max_errors
    }

    fn check_presence(&self, root: &XmlNode, field: &Field, result: &mut ValidationResult) {
        let Some(leaf) = path_segments(&field.path).last() else {
            return;
        };

        for parent in find_elements(root, &field.parent_path) {
            if !has_member(parent.node, leaf) {
                let path = if parent.path.is_empty() {
                    leaf.to_string()
                } else {
                    format!("{}/{}", parent.path, leaf)
                };
                let message = format!(
                    "Missing mandatory field: {} at path {}",
                    field.name, field.path
                );
                result.add_error(ValidationError::new(
                    ViolationKind::MissingMandatory,
                    &field.name,
                    path,
                    message,
                ));
            }
        }
    }

    fn check_values(
        &self,
        root: &XmlNode,
        index: usize,
        field: &Field,
        result: &mut ValidationResult,
    ) {
        let values = find_values(root, &field.path);
        if values.is_empty() {
            return;
        }

        let pattern = self.patterns.get(&index);
        if let Some(None) = pattern {
            result.add_warning(ValidationError::new(
                ViolationKind::InvalidPattern,
                &field.name,
                &field.path,
                format!("{}: pattern could not be compiled and was not checked", field.name),
            ));
        }

        let constraints = &field.constraints;
        for located in values {
            let mut checks: Vec<(ViolationKind, RuleResult)> = Vec::new();

            if constraints.has_length() {
                checks.push((
                    ViolationKind::Length,
                    validate_length(located.value, constraints),
                ));
            }
            if let Some(Some(regex)) = pattern {
                checks.push((ViolationKind::Pattern, validate_pattern(located.value, regex)));
            }
            if let Some(codes) = field.code_list.as_deref().filter(|codes| !codes.is_empty()) {
                checks.push((ViolationKind::CodeList, validate_code_list(located.value, codes)));
            }
            if constraints.has_digits() {
                checks.push((
                    ViolationKind::Digits,
                    validate_digits(
                        located.value,
                        constraints.total_digits,
                        constraints.fraction_digits,
                    ),
                ));
            }
            if constraints.minimum.is_some() || constraints.maximum.is_some() {
                checks.push((
                    ViolationKind::Bounds,
                    validate_bounds(located.value, constraints.minimum, constraints.maximum),
                ));
            }

            for (kind, outcome) in checks {
                if outcome.is_valid {
                    continue;
                }
                let message = outcome.message.unwrap_or_default();
                result.add_error(ValidationError::new(
                    kind,
                    &field.name,
                    &located.path,
                    format!("{}: {}", field.name, message),
                ));
            }
        }
    }
}
