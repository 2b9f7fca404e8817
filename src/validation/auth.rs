use garde::Validate;

use crate::error::{AppError, Result};

/// Runs a payload's `garde` rules and turns the report into a 400.
///
/// # Arguments
///
/// * `payload` - The deserialized request body.
///
/// # Returns
///
/// A `Result<()>` carrying every failed rule in one message.
pub fn validate_payload<T>(payload: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    payload.validate().map_err(|report| {
        let message = report
            .iter()
            .map(|(path, error)| {
                let path = path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        AppError::Validation(message)
    })
}

/// Trims surrounding whitespace from an email before it is looked up or stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{CreateUserPayload, LoginPayload};

    #[test]
    fn rejects_malformed_email() {
        let payload = LoginPayload {
            email: "not-an-email".to_string(),
        };
        match validate_payload(&payload) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("email")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_name() {
        let payload = CreateUserPayload {
            name: String::new(),
            email: "ana@example.com".to_string(),
        };
        assert!(matches!(
            validate_payload(&payload),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn accepts_valid_registration() {
        let payload = CreateUserPayload {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        };
        assert!(validate_payload(&payload).is_ok());
    }
}
