use super::types::{request, response};
use crate::{modules::auth::service, types::Context};
use std::sync::Arc;
use validator::Validate;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        response::Error::FailedToValidate(errors)
    })?;

    service::otp::send(
        ctx.clone(),
        service::otp::SendOtpPayload {
            phone: payload.phone.trim().to_string(),
            contact_handle: payload.telegram_username,
        },
    )
    .await
    .map(|_| response::Success::CodeSent)
    .map_err(|err| match err {
        service::otp::SendError::NotRegistered => response::Error::ContactNotRegistered,
        service::otp::SendError::NotSent => response::Error::FailedToDeliverCode,
        service::otp::SendError::UnexpectedError => response::Error::UnexpectedError,
    })
}
