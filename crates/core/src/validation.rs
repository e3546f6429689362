//! Input validation shared by request DTOs.
//!
//! DTOs derive [`validator::Validate`]; handlers call [`validate_request`] so
//! that every failure surfaces as [`CoreError::Validation`] with a readable
//! message instead of the raw `ValidationErrors` structure.

use validator::{Validate, ValidationErrors};

use crate::error::{CoreError, CoreResult};

/// Longest accepted username.
pub const MAX_USERNAME_LENGTH: u64 = 20;
/// Longest accepted password.
pub const MAX_PASSWORD_LENGTH: u64 = 20;
/// Longest accepted post or comment body.
pub const MAX_CONTENT_LENGTH: u64 = 10_000;

/// Run the derived validation rules for `input`.
pub fn validate_request<T: Validate>(input: &T) -> CoreResult<()> {
    input.validate().map_err(into_core_error)
}

fn into_core_error(errors: ValidationErrors) -> CoreError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| {
                    errs.first()
                        .map(|e| e.code.to_string())
                        .unwrap_or_else(|| "invalid".to_string())
                });
            format!("{field}: {detail}")
        })
        .collect();
    fields.sort();
    CoreError::Validation(fields.join(", "))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Credentials {
        #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
        username: String,
        #[validate(length(min = 1, max = 20))]
        password: String,
    }

    #[test]
    fn test_accepts_valid_input() {
        let input = Credentials {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(validate_request(&input).is_ok());
    }

    #[test]
    fn test_reports_every_failing_field_with_message_or_code() {
        let input = Credentials {
            username: String::new(),
            password: "x".repeat(MAX_PASSWORD_LENGTH as usize + 1),
        };
        let err = validate_request(&input).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) => {
            assert_eq!(msg, "password: length, username: must be between 1 and 20 characters");
        });
    }
}
