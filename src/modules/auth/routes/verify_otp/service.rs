use super::types::{request, response};
use crate::{
    modules::auth::{
        repository::contact::normalize_handle,
        service::{self, account},
    },
    types::Context,
    utils::validation::is_present,
};
use std::sync::Arc;
use validator::Validate;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        response::Error::FailedToValidate(errors)
    })?;

    let otp = service::otp::verify(ctx.clone(), payload.phone.trim(), payload.code.trim())
        .await
        .map_err(|err| match err {
            service::otp::VerificationError::InvalidOrExpired => {
                response::Error::InvalidOrExpiredCode
            }
            service::otp::VerificationError::UnexpectedError => response::Error::UnexpectedError,
        })?;

    if !payload.is_signup() {
        return Ok(response::Success::Verified);
    }

    let contact_handle = match payload.telegram_username {
        Some(ref handle) if is_present(&payload.telegram_username) => normalize_handle(handle),
        _ => otp.contact_handle.clone(),
    };

    let created = ctx
        .accounts
        .create_user(account::NewAccount {
            email: payload.email.unwrap_or_default().trim().to_string(),
            password: payload.password.unwrap_or_default(),
            full_name: payload.full_name.filter(|name| !name.trim().is_empty()),
            phone: otp.phone.clone(),
            contact_handle,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!("Created account {} for verified otp {}", user.id, otp.id);
            Ok(response::Success::SignedUp(user))
        }
        Err(err) => {
            service::otp::release(ctx.clone(), &otp).await;
            Err(match err {
                account::Error::Rejected(reason) => response::Error::AccountRejected(reason),
                account::Error::Unavailable => response::Error::FailedToCreateAccount,
            })
        }
    }
}
