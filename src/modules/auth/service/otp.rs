use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;

use crate::{
    modules::{
        auth::repository::{
            contact::normalize_handle,
            otp::{self, CreateOtpPayload, Otp},
        },
        notification,
    },
    types::Context,
};
use std::sync::Arc;

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

#[derive(Eq, PartialEq, Debug)]
pub enum SendError {
    NotRegistered,
    NotSent,
    UnexpectedError,
}

#[derive(Eq, PartialEq, Debug)]
pub enum VerificationError {
    InvalidOrExpired,
    UnexpectedError,
}

pub fn generate_code() -> String {
    rand::thread_rng()
        .gen_range(CODE_MIN..=CODE_MAX)
        .to_string()
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub struct SendOtpPayload {
    pub phone: String,
    pub contact_handle: String,
}

pub async fn send(ctx: Arc<Context>, payload: SendOtpPayload) -> Result<Otp, SendError> {
    let handle = normalize_handle(&payload.contact_handle);

    let chat_id = ctx
        .repository
        .contact
        .find_chat_id(&handle)
        .await
        .map_err(|_| SendError::UnexpectedError)?
        .ok_or_else(|| {
            tracing::info!("Contact handle @{} has not started the bot", handle);
            SendError::NotRegistered
        })?;

    let created_at = now();

    let code = generate_code();

    let otp = ctx
        .repository
        .otp
        .create(CreateOtpPayload {
            phone: payload.phone,
            contact_handle: handle,
            code: code.clone(),
            created_at,
            expires_at: created_at + Duration::minutes(ctx.otp.validity_minutes),
        })
        .await
        .map_err(|_| SendError::UnexpectedError)?;

    let delivered = notification::service::send(
        ctx.clone(),
        chat_id.to_string(),
        notification::service::Notification::verification_otp_requested(
            code,
            ctx.otp.validity_minutes,
        ),
    )
    .await;

    if delivered.is_err() {
        if ctx.repository.otp.discard(&otp.id).await.is_err() {
            tracing::error!("Undelivered otp {} could not be discarded", otp.id);
        }
        return Err(SendError::NotSent);
    }

    tracing::info!("Sent otp {} to @{}", otp.id, otp.contact_handle);

    // Older codes stay usable until the new one has actually been delivered.
    if ctx.otp.supersede_previous {
        match ctx
            .repository
            .otp
            .invalidate_pending(&otp.phone, &otp.id, now())
            .await
        {
            Ok(invalidated) => tracing::debug!("Invalidated {} older pending otps", invalidated),
            Err(_) => tracing::error!("Failed to invalidate otps older than {}", otp.id),
        }
    }

    Ok(otp)
}

pub async fn verify(ctx: Arc<Context>, phone: &str, code: &str) -> Result<Otp, VerificationError> {
    ctx.repository
        .otp
        .claim_latest(phone, code, now())
        .await
        .map_err(|_| VerificationError::UnexpectedError)?
        .ok_or(VerificationError::InvalidOrExpired)
}

pub async fn release(ctx: Arc<Context>, otp: &Otp) {
    match ctx.repository.otp.release(&otp.id).await {
        Ok(_) => tracing::info!("Released otp {} after a failed signup", otp.id),
        Err(_) => tracing::error!("Failed to release otp {}", otp.id),
    }
}

pub async fn purge_stale(ctx: Arc<Context>) -> Result<u64, otp::Error> {
    ctx.repository.otp.purge_stale(now()).await
}
