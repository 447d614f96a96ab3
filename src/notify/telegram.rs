//! Telegram Bot API notifier (sendMessage)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::NotificationError;
use crate::notify::Notifier;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

// The bot token is a credential; keep it out of logs
impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.send_message_url())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", message)])
            .send()
            .await
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| NotificationError::Transport(e.without_url()))?;

        let status = response.status();
        let parsed: Option<TelegramResponse> = response.json().await.ok();

        interpret_response(status, parsed)?;
        tracing::debug!(chat_id = %self.chat_id, "📨 Telegram message sent");
        Ok(())
    }
}

/// A message counts as delivered only on a 2xx status with `"ok": true`
fn interpret_response(
    status: StatusCode,
    body: Option<TelegramResponse>,
) -> Result<(), NotificationError> {
    match body {
        Some(body) if status.is_success() && body.ok => Ok(()),
        Some(body) => Err(NotificationError::Rejected {
            status,
            description: body.description.unwrap_or_else(|| "no description".to_string()),
        }),
        None => Err(NotificationError::Rejected {
            status,
            description: "unreadable response body".to_string(),
        }),
    }
}
