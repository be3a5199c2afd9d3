//! Constraint and enumeration extraction for tree-schema fields

use crate::model::{AttributeSpec, ElementSpec, SimpleType, TypeRegistry};
use catalog_model::{Constraints, normalize_type};
use regex::Regex;
use std::sync::LazyLock;

/// Length-encoding convention of the source standard: `Max35Text` caps text at 35 characters
static MAX_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Max(\d+)Text").expect("length convention pattern is valid"));

/// Facets and code list collected for one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub constraints: Constraints,
    /// Enumerated values in document order; may be empty
    pub code_list: Vec<String>,
}

/// Extract constraints and code list for an element particle
pub fn extract_element(registry: &TypeRegistry, element: &ElementSpec) -> Extraction {
    extract(registry, element.inline_simple(), element.type_name.as_deref())
}

/// Extract constraints and code list for an attribute
pub fn extract_attribute(registry: &TypeRegistry, attribute: &AttributeSpec) -> Extraction {
    extract(registry, attribute.inline.as_ref(), attribute.type_name.as_deref())
}

/// Inline restriction first, then the named simple type filling gaps, then the
/// `MaxNText` naming convention when no explicit maximum length was found.
/// Without a declared type, the inline restriction's base is the named type.
/// A complex type with simple content contributes the facets of its base.
/// Enumerations from both sources are concatenated without deduplication.
pub fn extract(
    registry: &TypeRegistry,
    inline: Option<&SimpleType>,
    type_name: Option<&str>,
) -> Extraction {
    let mut extraction = Extraction::default();

    if let Some(inline) = inline {
        extraction.constraints = inline.facets.constraints();
        extraction
            .code_list
            .extend(inline.facets.enumerations.iter().cloned());
    }

    let type_name = match (type_name, inline) {
        (Some(type_name), _) => normalize_type(type_name),
        (None, Some(inline)) if !inline.base.is_empty() => inline.base.clone(),
        (None, _) => return extraction,
    };

    let named = registry.simple_type(&type_name).or_else(|| {
        registry
            .complex_type(&type_name)
            .and_then(|complex| complex.base.as_deref())
            .and_then(|base| registry.simple_type(base))
    });
    if let Some(named) = named {
        extraction
            .constraints
            .fill_from(&named.facets.constraints());
        extraction
            .code_list
            .extend(named.facets.enumerations.iter().cloned());
    }

    if extraction.constraints.max_length.is_none() {
        extraction.constraints.max_length = max_text_length(&type_name);
    }

    extraction
}

/// Maximum length implied by a `MaxNText` type name
pub fn max_text_length(type_name: &str) -> Option<u32> {
    MAX_TEXT
        .captures(type_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
