//! Telegram Bot API notifier.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use warden_core::constants::{DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_TELEGRAM_API_URL};
use warden_core::error::{Result, WardenError};
use warden_core::traits::OperatorNotifier;
use warden_core::types::OperatorEvent;

use crate::message::render_event;

/// Telegram notifier configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_url: String,
    /// Bot token (secret)
    pub bot_token: String,
    /// Chat id of the admin group
    pub chat_id: i64,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per event before giving up
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl TelegramConfig {
    /// Creates a configuration for the public Bot API.
    pub fn new(bot_token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            api_url: DEFAULT_TELEGRAM_API_URL.into(),
            bot_token: bot_token.into(),
            chat_id,
            timeout_seconds: DEFAULT_NOTIFY_TIMEOUT_SECS,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts operator events to a Telegram chat.
#[derive(Debug)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    http_client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a notifier with the given configuration.
    pub fn with_config(config: TelegramConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(WardenError::ConfigError("Telegram bot token is empty".into()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WardenError::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Sends one message.
    ///
    /// Transport failures, 5xx and 429 are recoverable and leave delivery
    /// unknown. Any other 4xx or an `ok: false` reply is a `DeliveryFailed`
    /// rejection.
    async fn send(&self, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        });

        // The URL embeds the bot token, so it is stripped from errors.
        let response = self
            .http_client
            .post(self.config.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WardenError::timeout("sendMessage", self.config.timeout_seconds)
                } else {
                    WardenError::HttpError(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(WardenError::HttpError(format!("sendMessage returned HTTP {}", status)));
        }
        if status.is_client_error() {
            let description = response
                .json::<TelegramResponse>()
                .await
                .ok()
                .and_then(|r| r.description);
            return Err(WardenError::DeliveryFailed(
                description.unwrap_or_else(|| format!("sendMessage rejected with HTTP {}", status)),
            ));
        }

        let parsed: TelegramResponse = response
            .json()
            .await
            .map_err(|e| WardenError::HttpError(e.without_url().to_string()))?;

        if !parsed.ok {
            return Err(WardenError::DeliveryFailed(
                parsed
                    .description
                    .unwrap_or_else(|| format!("sendMessage rejected with HTTP {}", status)),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl OperatorNotifier for TelegramNotifier {
    #[instrument(skip(self, event), fields(kind = event.kind(), user = %event.user_id()))]
    async fn notify(&self, event: &OperatorEvent) -> Result<()> {
        let text = render_event(event);
        let attempts = self.config.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.send(&text).await {
                Ok(()) => {
                    debug!(attempt, "Operator notified");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() && attempt < attempts => {
                    warn!(attempt, error = %e, "Operator notification failed, retrying");
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Operator notification failed");
                    return Err(e);
                }
            }
        }
    }
}
