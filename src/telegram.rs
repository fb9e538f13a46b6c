use crate::config;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, warn};

// -----------------------------------------------
// TELEGRAM TRANSPORT
// -----------------------------------------------

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Chat seeded with the daily report at startup, if configured.
    pub default_chat_id: Option<i64>,
    pub enabled: bool,
    pub parse_mode: String,
}

impl TelegramConfig {
    pub fn new(bot_token: String, default_chat_id: Option<i64>) -> Self {
        Self {
            bot_token,
            default_chat_id,
            enabled: true,
            parse_mode: "Markdown".to_string(),
        }
    }

    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let default_chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|v| v.parse().ok());
        let enabled = std::env::var("TELEGRAM_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Some(Self {
            enabled,
            ..Self::new(bot_token, default_chat_id)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Updates {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub struct TelegramClient {
    config: TelegramConfig,
    http: reqwest::Client,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.bot_token.is_empty()
    }

    fn url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{}",
            self.config.bot_token, method
        )
    }

    /// Deliver one chat message. Transient failures (rate limit, server
    /// errors, network) are retried with exponential backoff.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if !self.is_enabled() {
            debug!(chat_id, "telegram disabled, dropping message");
            return Ok(());
        }

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let params = serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": self.config.parse_mode,
                "disable_web_page_preview": true,
            });

            let res = self
                .http
                .post(self.url("sendMessage"))
                .json(&params)
                .send()
                .await
                .context("sendMessage request failed")?;

            let status = res.status();
            if status.is_success() {
                debug!(chat_id, "telegram message delivered");
                return Ok(());
            }

            let body = res.text().await.unwrap_or_default();
            if status.as_u16() == 429 || status.is_server_error() {
                warn!(chat_id, %status, "telegram transient failure");
                bail!("Retryable telegram error: {status}")
            }

            bail!("Telegram send failed {status}: {body}")
        })
        .await
    }

    /// Long-poll for bot updates past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!(
            "{}?timeout={}&offset={}",
            self.url("getUpdates"),
            config::TELEGRAM_POLL_TIMEOUT_SECS,
            offset
        );

        let res = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(config::TELEGRAM_POLL_TIMEOUT_SECS + 10))
            .send()
            .await
            .context("getUpdates request failed")?;

        let updates: Updates = res.json().await.context("getUpdates decode failed")?;
        if !updates.ok {
            bail!("Telegram getUpdates returned ok=false");
        }

        Ok(updates.result)
    }
}
