use thiserror::Error;

/// Application-wide error types for stockwatch.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Page content could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Reading or writing the status file failed.
    #[error("Status store error: {0}")]
    StoreError(String),

    /// A notification channel failed to deliver.
    #[error("Notification error ({channel}): {message}")]
    NotificationError { channel: String, message: String },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if this error means the page could not be pulled.
    ///
    /// These are the only errors that end a run without a status decision.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::Timeout(_) | AppError::NetworkError(_)
        )
    }

    pub fn notification(channel: &str, message: impl Into<String>) -> Self {
        AppError::NotificationError {
            channel: channel.to_string(),
            message: message.into(),
        }
    }
}
