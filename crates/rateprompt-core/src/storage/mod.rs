//! Persistence media backing the rating store.
//!
//! A medium is a flat string key-value store. The prompt system only ever
//! writes decimal integers into it, under fixed keys owned by
//! [`RatingStore`](crate::RatingStore).

mod config;
pub mod database;
pub mod memory;

pub use config::{ActionLabels, EnjoyingActions, RatingConfig, StoreIdsConfig};
pub use database::SqliteMedium;
pub use memory::MemoryMedium;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::error::StorageError;

/// Durable key-value medium.
#[async_trait]
pub trait KeyValueMedium: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Batched read, one entry per requested key, in order.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Add one to the integer stored under `key` (absent counts as 0) and
    /// return the new value. See [`next_count`] for unparseable values.
    ///
    /// The default is a plain read-then-write and can lose updates under
    /// concurrent callers. Media that can do it atomically override this.
    async fn increment(&self, key: &str) -> Result<u64, StorageError> {
        let next = next_count(key, self.get(key).await?);
        self.set(key, &next.to_string()).await?;
        Ok(next)
    }
}

/// Parse a stored counter, treating absence as zero.
pub(crate) fn parse_count(key: &str, raw: Option<String>) -> Result<u64, StorageError> {
    match raw {
        None => Ok(0),
        Some(value) => value.trim().parse::<u64>().map_err(|_| StorageError::Corrupt {
            key: key.to_string(),
            value,
        }),
    }
}

/// The value a counter moves to on increment.
///
/// Unparseable text restarts the count at 1 so a damaged counter repairs
/// itself on the next write. The top of the range saturates.
pub(crate) fn next_count(key: &str, raw: Option<String>) -> u64 {
    match parse_count(key, raw) {
        Ok(current) => current.saturating_add(1),
        Err(e) => {
            warn!(error = %e, "restarting unreadable counter");
            1
        }
    }
}

/// Returns the rateprompt data directory.
///
/// `RATEPROMPT_DATA_DIR` wins when set. Otherwise `~/.config/rateprompt`, or
/// `~/.config/rateprompt-dev` when `RATEPROMPT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("RATEPROMPT_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RATEPROMPT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("rateprompt-dev")
            } else {
                base_dir.join("rateprompt")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
