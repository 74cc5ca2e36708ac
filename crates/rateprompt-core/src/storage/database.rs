//! SQLite-backed persistence medium.
//!
//! Values live in a single `kv` table so the on-disk layout mirrors the flat
//! key space the prompt store addresses.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{data_dir, next_count, KeyValueMedium};
use crate::error::StorageError;

/// SQLite database used as a key-value medium.
///
/// Calls run synchronously on the caller's task; every statement is a
/// single-row lookup or upsert.
pub struct SqliteMedium {
    conn: Mutex<Connection>,
}

impl SqliteMedium {
    /// Open the database at `<data_dir>/rateprompt.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::open_path(dir.join("rateprompt.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Backend("connection mutex poisoned".into()))
    }

    fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
        conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
    }

    fn kv_set(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueMedium for SqliteMedium {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        Ok(Self::kv_get(&conn, key)?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        Ok(Self::kv_set(&conn, key, value)?)
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let conn = self.lock()?;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(Self::kv_get(&conn, key)?);
        }
        Ok(values)
    }

    async fn increment(&self, key: &str) -> Result<u64, StorageError> {
        let mut conn = self.lock()?;
        // IMMEDIATE takes the write lock up front so other processes sharing
        // the file cannot interleave between the read and the write.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let next = next_count(key, Self::kv_get(&tx, key)?);
        Self::kv_set(&tx, key, &next.to_string())?;
        tx.commit()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kv_store() {
        let db = SqliteMedium::open_memory().unwrap();
        assert!(db.get("test").await.unwrap().is_none());
        db.set("test", "hello").await.unwrap();
        assert_eq!(db.get("test").await.unwrap().unwrap(), "hello");
    }

    #[tokio::test]
    async fn increment_starts_from_zero() {
        let db = SqliteMedium::open_memory().unwrap();
        assert_eq!(db.increment("n").await.unwrap(), 1);
        assert_eq!(db.increment("n").await.unwrap(), 2);
        assert_eq!(db.get("n").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn increment_repairs_corrupt_value() {
        let db = SqliteMedium::open_memory().unwrap();
        db.set("n", "lots").await.unwrap();
        assert_eq!(db.increment("n").await.unwrap(), 1);
        assert_eq!(db.get("n").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn increment_saturates_at_max() {
        let db = SqliteMedium::open_memory().unwrap();
        db.set("n", &u64::MAX.to_string()).await.unwrap();
        assert_eq!(db.increment("n").await.unwrap(), u64::MAX);
        assert_eq!(db.get("n").await.unwrap(), Some(u64::MAX.to_string()));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rateprompt.db");
        {
            let db = SqliteMedium::open_path(&path).unwrap();
            db.set("k", "42").await.unwrap();
        }
        let db = SqliteMedium::open_path(&path).unwrap();
        let values = db.multi_get(&["k", "missing"]).await.unwrap();
        assert_eq!(values, vec![Some("42".to_string()), None]);
    }
}
