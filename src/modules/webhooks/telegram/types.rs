pub mod request {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Update {
        pub update_id: i64,
        pub message: Option<Message>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Message {
        pub chat: Chat,
        pub from: Option<User>,
        pub text: Option<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Chat {
        pub id: i64,
        #[serde(rename = "type")]
        pub kind: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct User {
        pub username: Option<String>,
    }
}

pub mod response {
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        ContactRegistered,
        Ignored,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            let registered = matches!(self, Self::ContactRegistered);
            (
                StatusCode::OK,
                Json(json!({ "ok": true, "registered": registered })),
            )
                .into_response()
        }
    }

    pub enum Error {
        Unauthorized,
        UnexpectedError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Invalid secret token" })),
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
