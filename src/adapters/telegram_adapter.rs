//! Telegram bot notification adapter.

use crate::domain::error::QuantsignalError;
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::NotifyPort;
use std::time::Duration;

const API_URL: &str = "https://api.telegram.org";

pub struct TelegramAdapter {
    client: reqwest::blocking::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramAdapter {
    pub fn new(token: &str, chat_id: &str) -> Result<Self, QuantsignalError> {
        Self::with_api_url(API_URL, token, chat_id)
    }

    pub fn with_api_url(api_url: &str, token: &str, chat_id: &str) -> Result<Self, QuantsignalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| QuantsignalError::Notification {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        })
    }

    /// Builds an adapter from `[telegram] token` and `chat_id`. Returns
    /// `Ok(None)` when either is missing so callers can run without alerts.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Option<Self>, QuantsignalError> {
        let token = config.get_string("telegram", "token");
        let chat_id = config.get_string("telegram", "chat_id");
        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Self::new(token.trim(), chat_id.trim()).map(Some),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        })
    }
}

impl NotifyPort for TelegramAdapter {
    fn send(&self, message: &str) -> Result<(), QuantsignalError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(message))
            .send()
            .map_err(|e| QuantsignalError::Notification {
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(QuantsignalError::Notification {
                reason: format!("telegram returned HTTP {}", status),
            });
        }
        tracing::debug!(chat_id = %self.chat_id, "telegram message sent");
        Ok(())
    }
}
