pub mod request {
    use crate::utils::validation::not_blank;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Payload {
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub phone: String,
        #[serde(default, alias = "contact_handle")]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub telegram_username: String,
    }
}

pub mod response {
    use crate::utils::validation;
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        CodeSent,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::CodeSent => (
                    StatusCode::OK,
                    Json(json!({
                        "success": true,
                        "message": "Verification code sent to your Telegram chat"
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        FailedToValidate(ValidationErrors),
        ContactNotRegistered,
        FailedToDeliverCode,
        UnexpectedError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::ContactNotRegistered => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "contact handle not registered with the bot" })),
                )
                    .into_response(),
                Self::FailedToDeliverCode => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to deliver the code" })),
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
