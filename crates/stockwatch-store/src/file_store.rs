use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use stockwatch_core::error::AppError;
use stockwatch_core::models::StatusRecord;
use stockwatch_core::traits::StatusStore;

use crate::config::StoreConfig;

/// Status store backed by a single JSON file.
///
/// The file is a snapshot, not a log: every save replaces it. Writes are not
/// atomic; a torn file reads back as an error, which callers treat as "no
/// prior record".
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored record. A missing file is `Ok(None)`.
    pub async fn load(&self) -> Result<Option<StatusRecord>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No status file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(AppError::StoreError(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&raw).map(Some).map_err(|e| {
            AppError::StoreError(format!("Unparsable status file {}: {e}", self.path.display()))
        })
    }

    /// Overwrite the stored record, creating the parent directory if needed.
    pub async fn save(&self, record: &StatusRecord) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StoreError(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            AppError::StoreError(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

// -- Trait implementation --

impl StatusStore for FileStatusStore {
    async fn load(&self) -> Result<Option<StatusRecord>, AppError> {
        FileStatusStore::load(self).await
    }

    async fn save(&self, record: &StatusRecord) -> Result<(), AppError> {
        FileStatusStore::save(self, record).await
    }
}
