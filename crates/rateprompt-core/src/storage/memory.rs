//! In-memory implementation of `KeyValueMedium`.
//!
//! All values are lost when the medium is dropped. Used by tests and by hosts
//! that want prompt decisions scoped to a single process run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{next_count, KeyValueMedium};
use crate::error::StorageError;

/// In-memory medium.
///
/// Stores values in a `HashMap` protected by a `RwLock`. Reads and writes can
/// be made to fail on demand to exercise degraded paths.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    values: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a medium with existing values, e.g. state left by an older install.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Make every subsequent read fail with `StorageError::Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with `StorageError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of everything currently stored.
    pub async fn dump(&self) -> HashMap<String, String> {
        self.values.read().await.clone()
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueMedium for MemoryMedium {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_read()?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        self.check_read()?;
        let values = self.values.read().await;
        Ok(keys.iter().map(|k| values.get(*k).cloned()).collect())
    }

    async fn increment(&self, key: &str) -> Result<u64, StorageError> {
        self.check_read()?;
        self.check_write()?;
        let mut values = self.values.write().await;
        let next = next_count(key, values.get(key).cloned());
        values.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}
