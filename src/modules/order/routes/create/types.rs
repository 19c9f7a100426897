pub mod request {
    use crate::utils::validation::not_blank;
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Serialize};
    use std::borrow::Cow;
    use validator::{Validate, ValidationError};

    fn non_negative(price: &BigDecimal) -> Result<(), ValidationError> {
        match *price < BigDecimal::from(0) {
            true => Err(ValidationError::new("NEGATIVE_PRICE")
                .with_message(Cow::from("price must not be negative"))),
            false => Ok(()),
        }
    }

    #[derive(Deserialize, Serialize, Validate)]
    pub struct Item {
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub name: String,
        #[validate(range(min = 1, message = "quantity must be at least 1"))]
        pub quantity: i32,
        #[validate(custom(function = "non_negative"))]
        pub price: BigDecimal,
    }

    #[derive(Deserialize, Validate)]
    pub struct Payload {
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub customer_name: String,
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub customer_phone: String,
        #[serde(default)]
        #[validate(custom(code = "REQUIRED", function = "not_blank"))]
        pub customer_address: String,
        #[serde(default)]
        #[validate(length(min = 1, message = "at least one item is required"), nested)]
        pub items: Vec<Item>,
        pub user_id: Option<String>,
    }
}

pub mod response {
    use crate::{modules::order::repository::Order, utils::validation};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        OrderPlaced(Order),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::OrderPlaced(order) => (
                    StatusCode::CREATED,
                    Json(json!({
                        "success": true,
                        "id": order.id,
                        "total": order.total_price,
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        FailedToValidate(ValidationErrors),
        FailedToPlaceOrder,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::FailedToPlaceOrder => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to place order" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
