use std::future::Future;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Alert, PageContent, StatusRecord};

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Splits raw HTML into visible text and embedded structured data.
pub trait PageParser: Send + Sync + Clone {
    fn parse(&self, html: &str) -> Result<PageContent, AppError>;
}

/// Persists and retrieves the last observed status.
pub trait StatusStore: Send + Sync + Clone {
    /// Load the previous record. `Ok(None)` means no prior record.
    fn load(&self) -> impl Future<Output = Result<Option<StatusRecord>, AppError>> + Send;

    /// Overwrite the stored record.
    fn save(&self, record: &StatusRecord) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A single notification channel.
///
/// Object safe so that independently configured channels can be held
/// together in a [`NotifierSet`](crate::notify::NotifierSet).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs and errors (e.g. "telegram").
    fn channel(&self) -> &str;

    async fn notify(&self, alert: &Alert) -> Result<(), AppError>;
}

/// A no-op StatusStore for use when persistence is not needed.
#[derive(Debug, Clone)]
pub struct NullStore;

impl StatusStore for NullStore {
    async fn load(&self) -> Result<Option<StatusRecord>, AppError> {
        Ok(None)
    }

    async fn save(&self, _record: &StatusRecord) -> Result<(), AppError> {
        Ok(())
    }
}
