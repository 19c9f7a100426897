use super::types::{request, response};
use crate::{
    modules::{
        auth::repository::contact::normalize_handle,
        notification::{self, service::Notification},
    },
    types::Context,
};
use std::sync::Arc;

async fn reply(ctx: Arc<Context>, chat_id: i64, notification: Notification) {
    if notification::service::send(ctx.clone(), chat_id.to_string(), notification)
        .await
        .is_err()
    {
        tracing::warn!("Failed to reply to chat {}", chat_id);
    }
}

pub async fn service(ctx: Arc<Context>, update: request::Update) -> response::Response {
    let message = match update.message {
        Some(message) if message.chat.kind == "private" => message,
        _ => {
            tracing::debug!("Ignoring telegram update {}", update.update_id);
            return Ok(response::Success::Ignored);
        }
    };

    let chat_id = message.chat.id;
    tracing::debug!("Message from chat {}: {:?}", chat_id, message.text);
    let handle = message
        .from
        .and_then(|user| user.username)
        .map(|username| normalize_handle(&username))
        .filter(|handle| !handle.is_empty());

    let handle = match handle {
        Some(handle) => handle,
        None => {
            reply(ctx, chat_id, Notification::username_missing()).await;
            return Ok(response::Success::Ignored);
        }
    };

    let contact = ctx
        .repository
        .contact
        .upsert(&handle, chat_id)
        .await
        .map_err(|_| response::Error::UnexpectedError)?;

    tracing::info!("Registered @{} for chat {}", contact.handle, contact.chat_id);

    reply(
        ctx.clone(),
        chat_id,
        Notification::contact_registered(contact.handle),
    )
    .await;

    Ok(response::Success::ContactRegistered)
}
