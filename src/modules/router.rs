use super::{auth, order, webhooks};
use crate::types::Context;
use axum::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/auth", auth::routes::get_router())
        .nest("/orders", order::routes::get_router())
        .nest("/webhooks", webhooks::get_router())
}
