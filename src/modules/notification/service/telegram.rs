use super::{Error, Messenger, OutgoingMessage, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct TelegramMessenger {
    client: Client,
    send_endpoint: String,
}

impl TelegramMessenger {
    pub fn new(client: Client, api_endpoint: &str, bot_token: &str) -> Self {
        Self {
            client,
            send_endpoint: format!(
                "{}/bot{}/sendMessage",
                api_endpoint.trim_end_matches('/'),
                bot_token
            ),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        // The endpoint embeds the bot token, so errors are logged without their URL.
        let res = self
            .client
            .post(self.send_endpoint.clone())
            .json(&message)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to send telegram message: {}", err.without_url());
                Error::NotSent
            })?;

        if !res.status().is_success() {
            let status = res.status();
            match res.text().await {
                Ok(data) => {
                    tracing::error!("Telegram rejected message ({}): {}", status, data);
                }
                Err(err) => {
                    tracing::error!(
                        "Telegram rejected message ({}), failed to read body: {}",
                        status,
                        err.without_url()
                    );
                }
            }
            return Err(Error::NotSent);
        }

        tracing::debug!("Successfully sent telegram message");

        Ok(())
    }
}
