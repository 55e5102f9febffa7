use std::path::PathBuf;

use stockwatch_core::AppError;

pub const DEFAULT_STATE_FILE: &str = "last_status.json";

/// Configuration for the status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl StoreConfig {
    /// Read configuration from environment variables.
    ///
    /// - `STATE_FILE` (optional, defaults to `last_status.json` in the
    ///   working directory)
    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var("STATE_FILE") {
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(_)) => Err(AppError::ConfigError(
                "STATE_FILE is not valid unicode".into(),
            )),
            Ok(raw) => Self::from_path(raw),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(AppError::ConfigError("STATE_FILE must not be empty".into()));
        }
        Ok(Self { path })
    }
}
