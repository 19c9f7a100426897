pub mod request {
    use crate::utils::validation::{is_present, not_blank};
    use serde::Deserialize;
    use std::borrow::Cow;
    use validator::{Validate, ValidateEmail, ValidationError};

    fn validate_signup(payload: &Payload) -> Result<(), ValidationError> {
        if !payload.is_signup() {
            return Ok(());
        }

        if !is_present(&payload.email) || !is_present(&payload.password) {
            return Err(ValidationError::new("INCOMPLETE_SIGNUP").with_message(Cow::from(
                "email and password are both required to sign up",
            )));
        }

        match payload.email.as_deref().map(str::trim) {
            Some(email) if email.validate_email() => Ok(()),
            _ => Err(ValidationError::new("INVALID_EMAIL")
                .with_message(Cow::from("Invalid email address"))),
        }
    }

    #[derive(Deserialize, Validate)]
    #[validate(schema(function = "validate_signup"))]
    pub struct Payload {
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub phone: String,
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub code: String,
        pub email: Option<String>,
        pub password: Option<String>,
        pub full_name: Option<String>,
        #[serde(alias = "contact_handle")]
        pub telegram_username: Option<String>,
    }

    impl Payload {
        pub fn is_signup(&self) -> bool {
            is_present(&self.email) || is_present(&self.password)
        }
    }
}

pub mod response {
    use crate::{modules::auth::service::account::Account, utils::validation};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        Verified,
        SignedUp(Account),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Verified => (
                    StatusCode::OK,
                    Json(json!({ "success": true, "message": "Phone number verified" })),
                )
                    .into_response(),
                Self::SignedUp(user) => (
                    StatusCode::OK,
                    Json(json!({
                        "success": true,
                        "message": "Signup completed",
                        "user": user,
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        FailedToValidate(ValidationErrors),
        InvalidOrExpiredCode,
        AccountRejected(String),
        FailedToCreateAccount,
        UnexpectedError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::InvalidOrExpiredCode => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid or expired code" })),
                )
                    .into_response(),
                Self::AccountRejected(reason) => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Failed to create account", "details": reason })),
                )
                    .into_response(),
                Self::FailedToCreateAccount => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create account" })),
                )
                    .into_response(),
                Self::UnexpectedError => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Sorry an error occurred" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
