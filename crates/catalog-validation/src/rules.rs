//! Value rules applied to leaf text

use catalog_model::Constraints;
use regex::Regex;

/// Validation rule result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl RuleResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Check length bounds, counting characters rather than bytes
#[must_use]
pub fn validate_length(value: &str, constraints: &Constraints) -> RuleResult {
    let len = value.chars().count();

    if let Some(max) = constraints.max_length {
        if len > max as usize {
            return RuleResult::invalid(format!(
                "Value exceeds maximum length {max} (got {len} characters)"
            ));
        }
    }

    if let Some(min) = constraints.min_length {
        if len < min as usize {
            return RuleResult::invalid(format!(
                "Value below minimum length {min} (got {len} characters)"
            ));
        }
    }

    RuleResult::valid()
}

/// Compile a schema pattern, anchored at both ends the way schema patterns apply
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

/// Check a value against a compiled pattern
#[must_use]
pub fn validate_pattern(value: &str, pattern: &Regex) -> RuleResult {
    if pattern.is_match(value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!("Value '{value}' does not match required pattern"))
    }
}

/// Check membership in a code list
#[must_use]
pub fn validate_code_list(value: &str, codes: &[String]) -> RuleResult {
    if codes.iter().any(|code| code == value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Invalid value '{value}'. Must be one of: {}",
            codes.join(", ")
        ))
    }
}

/// Check total and fractional digit counts of a decimal literal
#[must_use]
pub fn validate_digits(value: &str, total: Option<u32>, fraction: Option<u32>) -> RuleResult {
    let Some((integer_digits, fraction_digits)) = decimal_digits(value) else {
        return RuleResult::invalid(format!("Value '{value}' is not a decimal number"));
    };

    if let Some(max) = fraction {
        if fraction_digits > max as usize {
            return RuleResult::invalid(format!(
                "Value '{value}' has {fraction_digits} fraction digits, maximum is {max}"
            ));
        }
    }

    if let Some(max) = total {
        let digits = integer_digits + fraction_digits;
        if digits > max as usize {
            return RuleResult::invalid(format!(
                "Value '{value}' has {digits} significant digits, maximum is {max}"
            ));
        }
    }

    RuleResult::valid()
}

/// Check inclusive numeric bounds
#[must_use]
pub fn validate_bounds(value: &str, minimum: Option<f64>, maximum: Option<f64>) -> RuleResult {
    let Ok(number) = value.trim().parse::<f64>() else {
        return RuleResult::invalid(format!("Value '{value}' is not a number"));
    };

    if let Some(min) = minimum {
        if number < min {
            return RuleResult::invalid(format!("Value {value} is below minimum {min}"));
        }
    }

    if let Some(max) = maximum {
        if number > max {
            return RuleResult::invalid(format!("Value {value} exceeds maximum {max}"));
        }
    }

    RuleResult::valid()
}

/// Significant integer digits and fraction digits of a decimal literal.
///
/// Leading integer zeros and trailing fraction zeros do not count.
fn decimal_digits(value: &str) -> Option<(usize, usize)> {
    let unsigned = value.trim().trim_start_matches(|c| c == '+' || c == '-');
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    Some((integer.len(), fraction.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_characters() {
        let constraints = Constraints {
            max_length: Some(3),
            min_length: Some(2),
            ..Default::default()
        };
        assert!(validate_length("äöü", &constraints).is_valid);
        assert!(!validate_length("abcd", &constraints).is_valid);

        let short = validate_length("a", &constraints);
        assert!(!short.is_valid);
        assert!(short.message.unwrap().contains("minimum length 2"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let pattern = compile_pattern("[A-Z]{3,3}").unwrap();
        assert!(validate_pattern("EUR", &pattern).is_valid);
        assert!(!validate_pattern("EURO", &pattern).is_valid);
        assert!(!validate_pattern("xEUR", &pattern).is_valid);
    }

    #[test]
    fn test_invalid_pattern_does_not_compile() {
        assert!(compile_pattern("[A-Z").is_err());
    }

    #[test]
    fn test_code_list() {
        let codes = vec!["CHK".to_string(), "TRF".to_string()];
        assert!(validate_code_list("TRF", &codes).is_valid);

        let result = validate_code_list("WIRE", &codes);
        assert_eq!(
            result.message.as_deref(),
            Some("Invalid value 'WIRE'. Must be one of: CHK, TRF")
        );
    }

    #[test]
    fn test_digits() {
        assert!(validate_digits("100.00", Some(3), Some(0)).is_valid);
        assert!(validate_digits("-0.125", Some(3), Some(3)).is_valid);
        assert!(!validate_digits("123.45", Some(4), None).is_valid);
        assert!(!validate_digits("1.123456", None, Some(5)).is_valid);
        assert!(!validate_digits("12a", Some(18), None).is_valid);
        assert!(!validate_digits(".", Some(18), None).is_valid);
    }

    #[test]
    fn test_bounds() {
        assert!(validate_bounds("0", Some(0.0), None).is_valid);
        assert!(!validate_bounds("-0.01", Some(0.0), None).is_valid);
        assert!(!validate_bounds("11", None, Some(10.0)).is_valid);
        assert!(!validate_bounds("ten", Some(0.0), None).is_valid);
    }
}
