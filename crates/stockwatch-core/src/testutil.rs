//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Alert, Availability, PageContent, StatusRecord};
use crate::traits::{Fetcher, Notifier, PageParser, StatusStore};
use crate::watch::{Stage, WatchEvent, WatchReporter};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockParser
// ---------------------------------------------------------------------------

/// Mock parser: the fetched text becomes the visible text, and the
/// configured JSON-LD blocks are attached.
#[derive(Clone)]
pub struct MockParser {
    json_ld: Vec<serde_json::Value>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockParser {
    pub fn passthrough() -> Self {
        Self::with_json_ld(Vec::new())
    }

    pub fn with_json_ld(json_ld: Vec<serde_json::Value>) -> Self {
        Self {
            json_ld,
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            json_ld: Vec::new(),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl PageParser for MockParser {
    fn parse(&self, html: &str) -> Result<PageContent, AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        Ok(PageContent {
            visible_text: html.to_string(),
            json_ld: self.json_ld.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// Mock store that records saves and returns a configurable previous record.
#[derive(Clone)]
pub struct MockStore {
    pub saved: Arc<Mutex<Vec<StatusRecord>>>,
    latest: Arc<Mutex<Option<StatusRecord>>>,
    load_error: Arc<Mutex<Option<AppError>>>,
    save_error: Arc<Mutex<Option<AppError>>>,
}

impl MockStore {
    /// Empty store: first run, no previous record.
    pub fn empty() -> Self {
        Self {
            saved: Arc::new(Mutex::new(Vec::new())),
            latest: Arc::new(Mutex::new(None)),
            load_error: Arc::new(Mutex::new(None)),
            save_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Store holding a previous record for `url`.
    pub fn with_previous(url: &str, status: Availability) -> Self {
        let store = Self::empty();
        *store.latest.lock().unwrap() = Some(StatusRecord::new(url, status));
        store
    }

    /// Store whose load fails.
    pub fn with_load_error(error: AppError) -> Self {
        let store = Self::empty();
        *store.load_error.lock().unwrap() = Some(error);
        store
    }

    /// Store whose save fails.
    pub fn with_save_error(error: AppError) -> Self {
        let store = Self::empty();
        *store.save_error.lock().unwrap() = Some(error);
        store
    }

    pub fn last_saved(&self) -> Option<StatusRecord> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl StatusStore for MockStore {
    async fn load(&self) -> Result<Option<StatusRecord>, AppError> {
        if let Some(e) = self.load_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.latest.lock().unwrap().clone())
    }

    async fn save(&self, record: &StatusRecord) -> Result<(), AppError> {
        if let Some(e) = self.save_error.lock().unwrap().take() {
            return Err(e);
        }
        self.saved.lock().unwrap().push(record.clone());
        *self.latest.lock().unwrap() = Some(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notification channel that records delivered alerts.
#[derive(Clone)]
pub struct MockNotifier {
    channel: String,
    pub sent: Arc<Mutex<Vec<Alert>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockNotifier {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Channel whose next delivery fails.
    pub fn failing(channel: &str, error: AppError) -> Self {
        let notifier = Self::new(channel);
        *notifier.error.lock().unwrap() = Some(error);
        notifier
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn notify(&self, alert: &Alert) -> Result<(), AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock run reporter that records events.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
    pub stages: Arc<Mutex<Vec<Stage>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl WatchReporter for MockReporter {
    fn report(&self, event: WatchEvent<'_>) {
        let label = match &event {
            WatchEvent::Fetching { .. } => "Fetching",
            WatchEvent::Fetched { .. } => "Fetched",
            WatchEvent::FetchFailed { .. } => "FetchFailed",
            WatchEvent::ParseFailed { .. } => "ParseFailed",
            WatchEvent::Assessed { .. } => "Assessed",
            WatchEvent::PreviousUnavailable { .. } => "PreviousUnavailable",
            WatchEvent::Evaluated { .. } => "Evaluated",
            WatchEvent::NoChannels => "NoChannels",
            WatchEvent::Dispatched { .. } => "Dispatched",
            WatchEvent::Persisted { .. } => "Persisted",
            WatchEvent::PersistFailed { .. } => "PersistFailed",
            WatchEvent::Done { .. } => "Done",
        };
        self.stages.lock().unwrap().push(event.stage());
        self.events.lock().unwrap().push(label.to_string());
    }
}
