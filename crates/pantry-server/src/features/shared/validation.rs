//! Input validation utilities

/// Longest accepted name for ingredients and meals
pub const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,
    #[error("Name must be at most {max_length} characters")]
    TooLong { max_length: usize },
}

/// Validate a display name
///
/// # Rules
/// - Must not be empty or only whitespace
/// - Must not exceed `max_length` bytes
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.len() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

/// A weight in grams that must be finite and strictly positive
pub fn is_positive_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Plov", MAX_NAME_LENGTH).is_ok());
        assert_eq!(validate_name(" \t", MAX_NAME_LENGTH), Err(NameValidationError::Required));
        assert_eq!(
            validate_name("abcdef", 5),
            Err(NameValidationError::TooLong { max_length: 5 })
        );
    }

    #[test]
    fn test_is_positive_weight() {
        assert!(is_positive_weight(0.5));
        assert!(!is_positive_weight(0.0));
        assert!(!is_positive_weight(-3.0));
        assert!(!is_positive_weight(f64::INFINITY));
        assert!(!is_positive_weight(f64::NAN));
    }
}
