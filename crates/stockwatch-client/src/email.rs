use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use stockwatch_core::error::AppError;
use stockwatch_core::models::Alert;
use stockwatch_core::traits::Notifier;

pub const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(20);
const CHANNEL: &str = "email";

/// SMTP settings for the email channel.
#[derive(Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// Email channel: one plain-text message over SMTP with STARTTLS.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish_non_exhaustive()
    }
}

impl EmailNotifier {
    /// Build the channel. No connection is made until the first send.
    pub fn new(config: &EmailConfig) -> Result<Self, AppError> {
        let from = parse_mailbox("EMAIL_FROM", &config.from)?;
        let to = parse_mailbox("EMAIL_TO", &config.to)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::ConfigError(format!("SMTP host '{}': {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(DEFAULT_SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, alert: &Alert) -> Result<Message, AppError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert.title())
            .date_now()
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body())
            .map_err(|e| AppError::notification(CHANNEL, format!("building message: {e}")))
    }
}

fn parse_mailbox(name: &str, value: &str) -> Result<Mailbox, AppError> {
    value
        .parse()
        .map_err(|e| AppError::ConfigError(format!("Invalid {name} '{value}': {e}")))
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> Result<(), AppError> {
        let message = self.build_message(alert)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::notification(CHANNEL, e.to_string()))?;
        Ok(())
    }
}
