//! One-cell constraint summaries for tabular output

use catalog_model::Field;

/// Codes listed before the remainder is counted
const LISTED_CODES: usize = 5;

/// Type names whose constraints already say everything the type name would
const SELF_DESCRIBING_TYPES: [&str; 4] = ["Max", "ISODate", "ISODateTime", "Decimal"];

/// Full constraint description used in CSV output, `None` when nothing applies
pub fn describe_constraints(field: &Field) -> String {
    let mut parts = Vec::new();
    let constraints = &field.constraints;

    if !field.data_type.is_empty()
        && !SELF_DESCRIBING_TYPES
            .iter()
            .any(|marker| field.data_type.contains(marker))
    {
        parts.push(format!("Type: {}", field.data_type));
    }

    if let Some(max) = constraints.max_length {
        parts.push(format!("MaxLength: {max}"));
    }
    if let Some(min) = constraints.min_length {
        parts.push(format!("MinLength: {min}"));
    }
    if let Some(pattern) = &constraints.pattern {
        parts.push(format!("Pattern: {pattern}"));
    }
    if let Some(total) = constraints.total_digits {
        parts.push(format!("TotalDigits: {total}"));
    }
    if let Some(fraction) = constraints.fraction_digits {
        parts.push(format!("FractionDigits: {fraction}"));
    }
    if let Some(minimum) = constraints.minimum {
        parts.push(format!("Minimum: {minimum}"));
    }
    if let Some(maximum) = constraints.maximum {
        parts.push(format!("Maximum: {maximum}"));
    }

    if let Some(codes) = &field.code_list {
        let mut listed = codes
            .iter()
            .take(LISTED_CODES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if codes.len() > LISTED_CODES {
            listed.push_str(&format!(" (+ {} more)", codes.len() - LISTED_CODES));
        }
        parts.push(format!("Codes: {listed}"));
    }

    match field.data_type.as_str() {
        "ISODate" => parts.push("Format: ISODate (YYYY-MM-DD)".to_string()),
        "ISODateTime" => parts.push("Format: ISODateTime".to_string()),
        _ => {}
    }

    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join("; ")
    }
}

/// Compact description used in Markdown tables, `-` when nothing applies
pub fn brief_constraints(field: &Field) -> String {
    let mut parts = Vec::new();

    if let Some(max) = field.constraints.max_length {
        parts.push(format!("MaxLen: {max}"));
    }
    if let Some(codes) = &field.code_list {
        parts.push(format!("Codes: {}", codes.len()));
    }
    if field.constraints.pattern.is_some() {
        parts.push("Pattern".to_string());
    }

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}
