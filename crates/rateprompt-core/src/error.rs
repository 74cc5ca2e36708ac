//! Core error types for rateprompt-core.
//!
//! Each failure category of the prompt system has its own enum so callers can
//! tell a broken persistence medium apart from a host UI that failed to show
//! anything. Only [`ConfigError`] and [`PresentationError`] ever reach the
//! host application; storage and platform failures are degraded inside the
//! [`Requester`](crate::Requester).

use std::path::PathBuf;
use thiserror::Error;

use crate::host::Platform;

/// Core error type for rateprompt-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence medium errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Native review / URL opening errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Host alert presentation errors
    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required store identifier was missing or blank
    #[error("You must specify your app's {0} store ID on construction to use the rating requester")]
    MissingStoreId(Platform),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Persistence medium errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend rejected a read or write
    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// A stored value could not be parsed as a decimal integer
    #[error("Stored value for '{key}' is not a decimal integer: {value:?}")]
    Corrupt { key: String, value: String },

    /// The medium is not reachable at all
    #[error("Storage medium unavailable")]
    Unavailable,
}

/// Errors from the host's review and linking primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Native in-app review is not supported on this platform/OS version
    #[error("Native in-app review is not available")]
    ReviewUnavailable,

    /// Native in-app review was available but the request failed
    #[error("Native in-app review failed: {0}")]
    ReviewFailed(String),

    /// The URL could not be opened
    #[error("Failed to open {url}: {message}")]
    OpenUrlFailed { url: String, message: String },
}

/// Errors from the host's modal/alert primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    /// The alert could not be displayed or answered
    #[error("Failed to present alert: {0}")]
    Failed(String),

    /// The presenter resolved with a button that does not exist
    #[error("Presenter chose button {index} but the alert only has {buttons}")]
    InvalidChoice { index: usize, buttons: usize },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::CannotOpen =>
            {
                StorageError::Unavailable
            }
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
