//! Telegram Bot API notifications.
//!
//! Sends submission and summary messages to the configured chat with HTML
//! parse mode. Delivery is fire-and-forget from the cycle's point of view:
//! a failed send is logged and the event is still marked announced.

use crate::error::{PodiumError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

/// Message sink the poll cycle dispatches to. Trait so tests can swap in a
/// recording double.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Telegram notification client
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramNotifier {
    /// `api_url` is the Bot API base, normally `https://api.telegram.org`;
    /// overridable for tests against a local server.
    pub fn new(api_url: &str, bot_token: &str, chat_id: &str) -> Self {
        Self {
            client: Client::new(),
            send_url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
            chat_id: chat_id.to_string(),
        }
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let message = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        let resp = self
            .client
            .post(&self.send_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| PodiumError::Delivery(e.to_string()))?;

        if resp.status().is_success() {
            debug!(chat = %self.chat_id, "telegram message sent");
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(PodiumError::Delivery(format!("HTTP {status}: {body}")))
        }
    }
}
