pub mod auth;
pub mod notification;
pub mod order;
pub mod webhooks;

mod router;
pub use router::get_router;
