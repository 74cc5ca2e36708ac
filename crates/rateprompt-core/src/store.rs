//! Persistent engagement counters and prompt timestamps.
//!
//! The key names below are shared with installs created by earlier versions
//! of the prompt and must not change. Counters are stored as decimal
//! integers, timestamps as decimal epoch milliseconds.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage::{parse_count, KeyValueMedium};

pub const KEY_PREFIX: &str = "@RNRatingRequest.";
pub const EVENT_COUNT_KEY: &str = "@RNRatingRequest.EventCount";
pub const USES_COUNT_KEY: &str = "@RNRatingRequest.usesCount";
pub const RATED_TIMESTAMP_KEY: &str = "@RNRatingRequest.ratedTimestamp";
pub const DECLINED_TIMESTAMP_KEY: &str = "@RNRatingRequest.declinedTimestamp";
pub const LAST_SEEN_TIMESTAMP_KEY: &str = "@RNRatingRequest.lastSeenTimestamp";

/// The two engagement counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    /// Generic "use" of the app.
    Uses,
    /// Positive interaction.
    Events,
}

impl Counter {
    pub fn key(self) -> &'static str {
        match self {
            Counter::Uses => USES_COUNT_KEY,
            Counter::Events => EVENT_COUNT_KEY,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::Uses => f.write_str("uses"),
            Counter::Events => f.write_str("events"),
        }
    }
}

/// The three prompt timestamps; `None` when never recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTimestamps {
    pub rated_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Everything the evaluator needs, read in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub uses_count: u64,
    pub event_count: u64,
    pub rated_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Typed access to the prompt state kept in a [`KeyValueMedium`].
///
/// Failures of the medium itself are returned and the caller decides how to
/// degrade. A single unreadable value is logged and read as zero or absent,
/// so one damaged key never hides the others.
#[derive(Clone)]
pub struct RatingStore {
    medium: Arc<dyn KeyValueMedium>,
}

impl RatingStore {
    pub fn new(medium: Arc<dyn KeyValueMedium>) -> Self {
        Self { medium }
    }

    /// Write an explicit `0` for any counter that has never been stored.
    /// Idempotent.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        for counter in [Counter::Uses, Counter::Events] {
            let key = counter.key();
            if self.medium.get(key).await?.is_none() {
                debug!(key, "initializing counter");
                self.medium.set(key, "0").await?;
            }
        }
        Ok(())
    }

    pub async fn count(&self, counter: Counter) -> Result<u64, StorageError> {
        let key = counter.key();
        Ok(count_or_zero(key, self.medium.get(key).await?))
    }

    /// Add one to a counter and return the new value.
    pub async fn increment(&self, counter: Counter) -> Result<u64, StorageError> {
        self.medium.increment(counter.key()).await
    }

    pub async fn timestamps(&self) -> Result<PromptTimestamps, StorageError> {
        let keys = [
            RATED_TIMESTAMP_KEY,
            DECLINED_TIMESTAMP_KEY,
            LAST_SEEN_TIMESTAMP_KEY,
        ];
        let mut values = self.medium.multi_get(&keys).await?.into_iter();
        let mut next = || values.next().flatten();
        Ok(PromptTimestamps {
            rated_at: timestamp_or_none(RATED_TIMESTAMP_KEY, next()),
            declined_at: timestamp_or_none(DECLINED_TIMESTAMP_KEY, next()),
            last_seen_at: timestamp_or_none(LAST_SEEN_TIMESTAMP_KEY, next()),
        })
    }

    /// Counters and timestamps in a single batched read.
    pub async fn snapshot(&self) -> Result<EngagementSnapshot, StorageError> {
        let keys = [
            USES_COUNT_KEY,
            EVENT_COUNT_KEY,
            RATED_TIMESTAMP_KEY,
            DECLINED_TIMESTAMP_KEY,
            LAST_SEEN_TIMESTAMP_KEY,
        ];
        let mut values = self.medium.multi_get(&keys).await?.into_iter();
        let mut next = || values.next().flatten();
        Ok(EngagementSnapshot {
            uses_count: count_or_zero(USES_COUNT_KEY, next()),
            event_count: count_or_zero(EVENT_COUNT_KEY, next()),
            rated_at: timestamp_or_none(RATED_TIMESTAMP_KEY, next()),
            declined_at: timestamp_or_none(DECLINED_TIMESTAMP_KEY, next()),
            last_seen_at: timestamp_or_none(LAST_SEEN_TIMESTAMP_KEY, next()),
        })
    }

    pub async fn record_rated(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_timestamp(RATED_TIMESTAMP_KEY, at).await
    }

    pub async fn record_declined(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_timestamp(DECLINED_TIMESTAMP_KEY, at).await
    }

    pub async fn record_seen(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.write_timestamp(LAST_SEEN_TIMESTAMP_KEY, at).await
    }

    /// Set both counters back to `0`. Timestamps are left alone.
    pub async fn reset_counters(&self) -> Result<(), StorageError> {
        for counter in [Counter::Events, Counter::Uses] {
            self.medium.set(counter.key(), "0").await?;
        }
        Ok(())
    }

    async fn write_timestamp(&self, key: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.medium
            .set(key, &at.timestamp_millis().to_string())
            .await
    }
}

impl fmt::Debug for RatingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatingStore").finish_non_exhaustive()
    }
}

fn count_or_zero(key: &str, raw: Option<String>) -> u64 {
    parse_count(key, raw).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable counter, reading as 0");
        0
    })
}

fn timestamp_or_none(key: &str, raw: Option<String>) -> Option<DateTime<Utc>> {
    parse_timestamp(key, raw).unwrap_or_else(|e| {
        warn!(error = %e, "unreadable timestamp, reading as absent");
        None
    })
}

fn parse_timestamp(
    key: &str,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let corrupt = || StorageError::Corrupt {
        key: key.to_string(),
        value: value.clone(),
    };
    let millis = value.trim().parse::<i64>().map_err(|_| corrupt())?;
    match Utc.timestamp_millis_opt(millis).single() {
        Some(at) => Ok(Some(at)),
        None => Err(corrupt()),
    }
}
