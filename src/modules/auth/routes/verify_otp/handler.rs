use super::{service::service, types::request};
use crate::{types::Context, utils::validation};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    payload: Result<Json<request::Payload>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(payload)) => service(ctx, payload).await.into_response(),
        Err(rejection) => validation::rejection_into_response(rejection).into_response(),
    }
}
