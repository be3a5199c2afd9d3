//! Field records for the flattened catalog

use crate::constraints::Constraints;
use crate::normalize::{canonical_path, path_segments};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper occurrence bound of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "MaxOccursRepr", try_from = "MaxOccursRepr")]
pub enum MaxOccurs {
    /// At most this many occurrences
    Bounded(u32),
    /// No upper limit
    Unbounded,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxOccursRepr {
    Count(u32),
    Word(String),
}

impl From<MaxOccurs> for MaxOccursRepr {
    fn from(max: MaxOccurs) -> Self {
        match max {
            MaxOccurs::Bounded(n) => MaxOccursRepr::Count(n),
            MaxOccurs::Unbounded => MaxOccursRepr::Word("unbounded".to_string()),
        }
    }
}

impl TryFrom<MaxOccursRepr> for MaxOccurs {
    type Error = Error;

    fn try_from(repr: MaxOccursRepr) -> Result<Self> {
        match repr {
            MaxOccursRepr::Count(n) => Ok(MaxOccurs::Bounded(n)),
            MaxOccursRepr::Word(word) => word.parse(),
        }
    }
}

impl MaxOccurs {
    /// Whether more than one occurrence is allowed
    pub fn is_repeatable(&self) -> bool {
        match self {
            MaxOccurs::Bounded(n) => *n > 1,
            MaxOccurs::Unbounded => true,
        }
    }
}

impl FromStr for MaxOccurs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") || s == "*" {
            return Ok(MaxOccurs::Unbounded);
        }
        s.parse::<u32>()
            .map(MaxOccurs::Bounded)
            .map_err(|e| Error::invalid_occurs(s, e.to_string()))
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{n}"),
            MaxOccurs::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Occurrence bounds of a field within its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: MaxOccurs,
}

impl Cardinality {
    /// Create bounds from a minimum and a maximum
    pub fn new(min: u32, max: MaxOccurs) -> Self {
        Self { min, max }
    }

    /// `1..1`
    pub fn required() -> Self {
        Self::new(1, MaxOccurs::Bounded(1))
    }

    /// `0..1`
    pub fn optional() -> Self {
        Self::new(0, MaxOccurs::Bounded(1))
    }

    /// Whether the field may repeat (maximum above one or unbounded)
    pub fn is_repeatable(&self) -> bool {
        self.max.is_repeatable()
    }

    /// Whether the field may be absent
    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    /// Requirement classification derived from the minimum
    pub fn requirement(&self) -> Requirement {
        Requirement::from_min_occurs(self.min)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::required()
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (min, max) = s
            .split_once("..")
            .ok_or_else(|| Error::InvalidMultiplicity(s.to_string()))?;
        let min = min
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::invalid_occurs(min, e.to_string()))?;
        Ok(Self::new(min, max.parse()?))
    }
}

/// Requirement classification of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Mandatory,
    Optional,
    /// Reserved; no loader produces it yet
    Conditional,
}

impl Requirement {
    /// `Mandatory` when at least one occurrence is required
    pub fn from_min_occurs(min: u32) -> Self {
        if min >= 1 {
            Requirement::Mandatory
        } else {
            Requirement::Optional
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Mandatory => "mandatory",
            Requirement::Optional => "optional",
            Requirement::Conditional => "conditional",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flattened entry of a schema tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Leaf name in the schema tree
    #[serde(rename = "fieldName")]
    pub name: String,

    /// Ancestor names joined with the source format's separator
    pub path: String,

    /// Canonical type name (primitive or named type)
    pub data_type: String,

    pub cardinality: Cardinality,

    pub requirement: Requirement,

    /// Documentation text, empty when the schema carries none
    #[serde(rename = "definition")]
    pub documentation: String,

    pub constraints: Constraints,

    /// Enumerated values; never `Some` of an empty list
    pub code_list: Option<Vec<String>>,

    /// Path of the enclosing structure, empty at the top level
    pub parent_path: String,
}

impl Field {
    /// Create a field; the requirement follows from the cardinality minimum
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        data_type: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            data_type: data_type.into(),
            requirement: cardinality.requirement(),
            cardinality,
            documentation: String::new(),
            constraints: Constraints::default(),
            code_list: None,
            parent_path: String::new(),
        }
    }

    #[must_use]
    pub fn with_parent_path(mut self, parent_path: impl Into<String>) -> Self {
        self.parent_path = parent_path.into();
        self
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Attach a code list; an empty list is stored as `None`
    #[must_use]
    pub fn with_code_list(mut self, codes: Vec<String>) -> Self {
        self.code_list = if codes.is_empty() { None } else { Some(codes) };
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.requirement == Requirement::Mandatory
    }

    pub fn is_optional(&self) -> bool {
        self.requirement == Requirement::Optional
    }

    pub fn is_conditional(&self) -> bool {
        self.requirement == Requirement::Conditional
    }

    pub fn is_repeatable(&self) -> bool {
        self.cardinality.is_repeatable()
    }

    /// Multiplicity in `min..max` notation
    pub fn multiplicity(&self) -> String {
        self.cardinality.to_string()
    }

    /// Path with a single canonical separator, for cross-format comparison
    pub fn canonical_path(&self) -> String {
        canonical_path(&self.path)
    }

    /// Nesting depth (number of path segments)
    pub fn depth(&self) -> usize {
        path_segments(&self.path).count()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}",
            self.name,
            self.path,
            self.multiplicity(),
            self.requirement
        )
    }
}
