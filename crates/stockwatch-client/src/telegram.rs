use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stockwatch_core::error::AppError;
use stockwatch_core::models::Alert;
use stockwatch_core::traits::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_TELEGRAM_TIMEOUT: Duration = Duration::from_secs(15);
const CHANNEL: &str = "telegram";

/// Telegram Bot API channel (`sendMessage`).
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_TELEGRAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Point at a different Bot API server (self-hosted or test).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

// ---- Bot API types ----

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

fn message_text(alert: &Alert) -> String {
    format!("{}\n{}", alert.title(), alert.url)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> Result<(), AppError> {
        let request = SendMessage {
            chat_id: &self.chat_id,
            text: message_text(alert),
            disable_web_page_preview: true,
        };

        // The token is part of the URL; keep it out of error messages.
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::notification(CHANNEL, e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::notification(CHANNEL, e.without_url().to_string()))?;
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|r| r.description)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(AppError::notification(
                CHANNEL,
                format!("HTTP {}: {}", status.as_u16(), detail),
            ));
        }

        match parsed {
            Some(ApiResponse { ok: true, .. }) => Ok(()),
            Some(ApiResponse { description, .. }) => Err(AppError::notification(
                CHANNEL,
                description.unwrap_or_else(|| "request rejected".to_string()),
            )),
            None => Err(AppError::notification(CHANNEL, "unexpected response body")),
        }
    }
}
