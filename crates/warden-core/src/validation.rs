//! Validation utilities.

use crate::{FieldError, WardenError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `WardenError` on failure.
    fn validate_request(&self) -> Result<(), WardenError> {
        self.validate().map_err(validation_errors_to_warden_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into per-field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `WardenError`.
#[must_use]
pub fn validation_errors_to_warden_error(errors: ValidationErrors) -> WardenError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    WardenError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a username uses only letters, digits, `_` and `-`.
    pub fn valid_username(username: &str) -> Result<(), ValidationError> {
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::new("username_invalid_characters"));
        }
        if !username.chars().next().is_some_and(char::is_alphabetic) {
            return Err(ValidationError::new("username_must_start_with_letter"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Account {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_valid_username() {
        assert!(valid_username("john_doe").is_ok());
        assert!(valid_username("john-doe").is_ok());
        assert!(valid_username("123abc").is_err());
        assert!(valid_username("john@doe").is_err());
    }

    #[test]
    fn test_validate_request_maps_to_validation_error() {
        let account = Account {
            name: "ab".to_string(),
            email: "not-an-email".to_string(),
        };
        match account.validate_request() {
            Err(WardenError::Validation(msg)) => {
                assert!(msg.contains("name: too short"));
                assert!(msg.contains("email"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_request_ok() {
        let account = Account {
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(account.validate_request().is_ok());
    }
}
