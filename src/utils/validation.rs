use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::json;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub fn into_response(errors: ValidationErrors) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing or invalid fields", "details": errors })),
    )
}

pub fn rejection_into_response(rejection: JsonRejection) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid request body", "details": rejection.body_text() })),
    )
}

pub fn is_present(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    match value.trim().is_empty() {
        true => Err(ValidationError::new("REQUIRED").with_message(Cow::from("This field is required"))),
        false => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("+998901234567").is_ok());
    }

    #[test]
    fn presence_ignores_whitespace() {
        assert!(!is_present(&None));
        assert!(!is_present(&Some(" ".to_string())));
        assert!(is_present(&Some("ali@example.com".to_string())));
    }
}
