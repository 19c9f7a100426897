use super::types::{request, response};
use crate::{
    modules::order::{
        repository::{CreateOrderPayload, OrderItem},
        service,
    },
    types::Context,
};
use std::sync::Arc;
use validator::Validate;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        response::Error::FailedToValidate(errors)
    })?;

    let items = payload
        .items
        .into_iter()
        .map(|item| OrderItem {
            name: item.name.trim().to_string(),
            quantity: item.quantity,
            price: item.price,
        })
        .collect();

    service::place_order(
        ctx,
        CreateOrderPayload {
            customer_name: payload.customer_name.trim().to_string(),
            customer_phone: payload.customer_phone.trim().to_string(),
            customer_address: payload.customer_address.trim().to_string(),
            items,
            user_id: payload.user_id.filter(|id| !id.trim().is_empty()),
        },
    )
    .await
    .map(response::Success::OrderPlaced)
    .map_err(|_| response::Error::FailedToPlaceOrder)
}
