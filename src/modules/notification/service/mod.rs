pub mod telegram;

use crate::{modules::order::repository::Order, types::Context};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: ParseMode,
}

pub mod types {
    use super::Order;

    #[derive(Clone)]
    pub struct VerificationOtpRequested {
        pub code: String,
        pub validity_minutes: i64,
    }

    #[derive(Clone)]
    pub struct OrderPlaced {
        pub order: Order,
    }

    #[derive(Clone)]
    pub struct ContactRegistered {
        pub handle: String,
    }

    #[derive(Clone)]
    pub struct UsernameMissing;
}

#[derive(Clone)]
pub enum Notification {
    VerificationOtpRequested(types::VerificationOtpRequested),
    OrderPlaced(types::OrderPlaced),
    ContactRegistered(types::ContactRegistered),
    UsernameMissing(types::UsernameMissing),
}

impl Notification {
    pub fn verification_otp_requested(code: String, validity_minutes: i64) -> Self {
        Notification::VerificationOtpRequested(types::VerificationOtpRequested {
            code,
            validity_minutes,
        })
    }

    pub fn order_placed(order: Order) -> Self {
        Notification::OrderPlaced(types::OrderPlaced { order })
    }

    pub fn contact_registered(handle: String) -> Self {
        Notification::ContactRegistered(types::ContactRegistered { handle })
    }

    pub fn username_missing() -> Self {
        Notification::UsernameMissing(types::UsernameMissing)
    }

    pub fn into_message(self, chat_id: String) -> OutgoingMessage {
        let (text, parse_mode) = match self {
            Notification::VerificationOtpRequested(n) => (
                format!(
                    "🔐 Your verification code: *{}*\nIt expires in {} minutes. Do not share it with anyone.",
                    n.code, n.validity_minutes
                ),
                ParseMode::Markdown,
            ),
            Notification::OrderPlaced(n) => (render_order(&n.order), ParseMode::Html),
            Notification::ContactRegistered(n) => (
                format!(
                    "✅ You are registered as <b>@{}</b>.\nVerification codes will be sent to this chat.",
                    escape_html(&n.handle)
                ),
                ParseMode::Html,
            ),
            Notification::UsernameMissing(_) => (
                "Please set a Telegram username in your settings, then send /start again."
                    .to_string(),
                ParseMode::Html,
            ),
        };

        OutgoingMessage {
            chat_id,
            text,
            parse_mode,
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_order(order: &Order) -> String {
    let items = order
        .items
        .iter()
        .map(|item| {
            format!(
                "• {} x{} - ${}",
                escape_html(&item.name),
                item.quantity,
                item.price.with_scale(2)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🛍️ <b>New order</b>\n👤 <b>Name:</b> {}\n📞 <b>Phone:</b> {}\n📍 <b>Address:</b> {}\n\n🧾 <b>Items:</b>\n{}\n\n💰 <b>Total:</b> ${}\n🆔 {}",
        escape_html(&order.customer_name),
        escape_html(&order.customer_phone),
        escape_html(&order.customer_address),
        items,
        order.total_price.with_scale(2),
        order.id
    )
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    NotSent,
}

pub type Result<T> = std::result::Result<T, Error>;

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}

pub async fn send(ctx: Arc<Context>, chat_id: String, notification: Notification) -> Result<()> {
    ctx.messenger.send(notification.into_message(chat_id)).await
}
