// src/services/telegram.rs

//! Telegram notification channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{NotifyConfig, TelegramCredentials};
use crate::utils::http;

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one alert for an available course.
    async fn notify(&self, course: &str) -> Result<()>;
}

/// Notifier backed by the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    config: NotifyConfig,
    credentials: TelegramCredentials,
    pou: String,
}

impl TelegramNotifier {
    /// Create a notifier from configuration and environment credentials.
    pub fn new(
        config: NotifyConfig,
        credentials: TelegramCredentials,
        pou: impl Into<String>,
    ) -> Result<Self> {
        let client = http::create_async_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            config,
            credentials,
            pou: pou.into(),
        })
    }

    /// Render the message template for a course.
    fn render(&self, course: &str) -> String {
        self.config
            .template
            .replace("{course}", course)
            .replace("{pou}", &self.pou)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.credentials.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, course: &str) -> Result<()> {
        let payload = json!({
            "chat_id": self.credentials.chat_id,
            "text": self.render(course),
            "parse_mode": self.config.parse_mode,
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            // strip the URL so the bot token never reaches the logs
            .map_err(|e| AppError::notify(e.without_url()))?;

        response
            .error_for_status()
            .map_err(|e| AppError::notify(e.without_url()))?;

        log::info!("Telegram notification sent for '{course}'");
        Ok(())
    }
}
