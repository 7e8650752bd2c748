//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be exactly {expected} characters, got {actual}")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid length validation error.
    pub fn invalid_length(field: impl Into<String>, expected: usize, actual: usize) -> Self {
        ValidationError::InvalidLength {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_field_name() {
        let err = ValidationError::empty_field("session_id");
        assert_eq!(err.to_string(), "Field 'session_id' cannot be empty");
    }

    #[test]
    fn invalid_length_displays_expected_and_actual() {
        let err = ValidationError::invalid_length("identifier", 18, 19);
        assert_eq!(
            err.to_string(),
            "Field 'identifier' must be exactly 18 characters, got 19"
        );
    }

    #[test]
    fn invalid_format_displays_reason() {
        let err = ValidationError::invalid_format("state_transition", "Cannot transition");
        assert!(err.to_string().contains("Cannot transition"));
    }
}
