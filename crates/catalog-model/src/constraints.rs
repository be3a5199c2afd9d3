//! Validation facets attached to a field

use serde::{Deserialize, Serialize};

/// Constraints collected from restriction facets or record-field properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,

    /// Regular expression the whole value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_digits: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,

    /// Inclusive lower numeric bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Inclusive upper numeric bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Record-form logical type annotation (e.g. `date`, `decimal`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_type: Option<String>,

    /// Informational type tag; not checked against values
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_tag: Option<String>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every facet still unset here from `other`; values already set win.
    pub fn fill_from(&mut self, other: &Constraints) {
        fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(other);
            }
        }

        fill(&mut self.max_length, &other.max_length);
        fill(&mut self.min_length, &other.min_length);
        fill(&mut self.pattern, &other.pattern);
        fill(&mut self.total_digits, &other.total_digits);
        fill(&mut self.fraction_digits, &other.fraction_digits);
        fill(&mut self.minimum, &other.minimum);
        fill(&mut self.maximum, &other.maximum);
        fill(&mut self.logical_type, &other.logical_type);
        fill(&mut self.type_tag, &other.type_tag);
    }

    /// True when no checkable facet is present (the type tag is informational)
    pub fn is_empty(&self) -> bool {
        !self.has_length()
            && !self.has_digits()
            && self.pattern.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.logical_type.is_none()
    }

    pub fn has_length(&self) -> bool {
        self.max_length.is_some() || self.min_length.is_some()
    }

    pub fn has_digits(&self) -> bool {
        self.total_digits.is_some() || self.fraction_digits.is_some()
    }
}
