//! Question types and the value rules applied to statistics answering them.

pub const TYPE_NUMERIC: &str = "numeric";
pub const TYPE_COUNT: &str = "count";
pub const TYPE_PERCENTAGE: &str = "percentage";
pub const TYPE_BOOLEAN: &str = "boolean";

/// All valid `question_type` values.
pub const VALID_QUESTION_TYPES: &[&str] = &[TYPE_NUMERIC, TYPE_COUNT, TYPE_PERCENTAGE, TYPE_BOOLEAN];

/// Maximum length of a question's text.
pub const MAX_QUESTION_TEXT_LENGTH: usize = 1_000;

/// Validate that the question type is one of the allowed values.
pub fn validate_question_type(question_type: &str) -> Result<(), String> {
    if VALID_QUESTION_TYPES.contains(&question_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid question type '{question_type}'. Must be one of: {}",
            VALID_QUESTION_TYPES.join(", ")
        ))
    }
}

/// Validate a submitted statistic value against its question's type.
pub fn validate_value(question_type: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err("Value must be a finite number".to_string());
    }
    match question_type {
        TYPE_NUMERIC => Ok(()),
        TYPE_COUNT if value >= 0.0 && value.fract() == 0.0 => Ok(()),
        TYPE_COUNT => Err("Count values must be non-negative whole numbers".to_string()),
        TYPE_PERCENTAGE if (0.0..=100.0).contains(&value) => Ok(()),
        TYPE_PERCENTAGE => Err("Percentage values must be between 0 and 100".to_string()),
        TYPE_BOOLEAN if value == 0.0 || value == 1.0 => Ok(()),
        TYPE_BOOLEAN => Err("Boolean values must be 0 or 1".to_string()),
        other => validate_question_type(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_requires_whole_non_negative() {
        assert!(validate_value(TYPE_COUNT, 4.0).is_ok());
        assert!(validate_value(TYPE_COUNT, 4.5).is_err());
        assert!(validate_value(TYPE_COUNT, -1.0).is_err());
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_value(TYPE_PERCENTAGE, 0.0).is_ok());
        assert!(validate_value(TYPE_PERCENTAGE, 100.0).is_ok());
        assert!(validate_value(TYPE_PERCENTAGE, 100.1).is_err());
    }

    #[test]
    fn boolean_only_zero_or_one() {
        assert!(validate_value(TYPE_BOOLEAN, 1.0).is_ok());
        assert!(validate_value(TYPE_BOOLEAN, 2.0).is_err());
    }

    #[test]
    fn numeric_rejects_non_finite() {
        assert!(validate_value(TYPE_NUMERIC, -12.75).is_ok());
        assert!(validate_value(TYPE_NUMERIC, f64::NAN).is_err());
        assert!(validate_value(TYPE_NUMERIC, f64::INFINITY).is_err());
    }

    #[test]
    fn unknown_type_is_reported() {
        let msg = validate_value("rating", 3.0).unwrap_err();
        assert!(msg.contains("Invalid question type 'rating'"));
    }
}
