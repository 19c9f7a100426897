use super::{
    service::service,
    types::{request, response},
};
use crate::{types::Context, utils::validation};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

fn is_authorized(ctx: &Context, headers: &HeaderMap) -> bool {
    let expected = match &ctx.telegram.webhook_secret {
        Some(secret) => secret,
        None => return true,
    };

    headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false)
}

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    headers: HeaderMap,
    payload: Result<Json<request::Update>, JsonRejection>,
) -> impl IntoResponse {
    if !is_authorized(&ctx, &headers) {
        tracing::warn!("Rejected telegram update with a missing or wrong secret token");
        return response::Error::Unauthorized.into_response();
    }

    match payload {
        Ok(Json(update)) => service(ctx, update).await.into_response(),
        Err(rejection) => validation::rejection_into_response(rejection).into_response(),
    }
}
