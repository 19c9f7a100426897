use super::repository::{self, CreateOrderPayload, Order};
use crate::{
    modules::notification::{self, service::Notification},
    types::Context,
};
use std::sync::Arc;

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub async fn place_order(ctx: Arc<Context>, payload: CreateOrderPayload) -> Result<Order, Error> {
    let mut order = ctx
        .repository
        .order
        .create(payload)
        .await
        .map_err(|_| Error::UnexpectedError)?;

    tracing::info!("Placed order {} ({} items)", order.id, order.items.len());

    match notification::service::send(
        ctx.clone(),
        ctx.telegram.orders_chat_id.clone(),
        Notification::order_placed(order.clone()),
    )
    .await
    {
        Ok(_) => match ctx.repository.order.mark_notified(&order.id).await {
            Ok(_) => order.telegram_notified = true,
            Err(repository::Error::UnexpectedError) => {
                tracing::error!("Order {} was announced but not marked as notified", order.id)
            }
        },
        Err(_) => tracing::warn!("Failed to announce order {} to the orders chat", order.id),
    }

    Ok(order)
}
