//! The object a host application talks to.
//!
//! The [`Requester`] composes the store, the evaluator, and the flow
//! controller behind four entry points. Storage failures are logged and
//! degraded here, so entry points only ever fail with a
//! [`PresentationError`].
//!
//! Only one dialog can be in flight per requester. A call that finds a dialog
//! already on screen resolves to [`PromptOutcome::NotShown`] instead of
//! queueing a second one.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::callbacks::PromptCallbacks;
use crate::eligibility::{EligibilityReport, Evaluator};
use crate::error::{ConfigError, PresentationError, StorageError};
use crate::flow::{FlowController, PromptOutcome, StoreIds};
use crate::host::Host;
use crate::storage::{KeyValueMedium, RatingConfig};
use crate::store::{Counter, EngagementSnapshot, RatingStore};

/// Current stored state and what the evaluator makes of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingStatus {
    pub snapshot: EngagementSnapshot,
    pub report: EligibilityReport,
}

/// Builder for [`Requester`].
pub struct RequesterBuilder {
    ios_id: String,
    android_id: String,
    medium: Arc<dyn KeyValueMedium>,
    host: Host,
    config: RatingConfig,
    callbacks: PromptCallbacks,
}

impl RequesterBuilder {
    pub fn config(mut self, config: RatingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn callbacks(mut self, callbacks: PromptCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// # Errors
    /// Returns [`ConfigError::MissingStoreId`] if either store ID is blank.
    pub fn build(self) -> Result<Requester, ConfigError> {
        let ids = StoreIds::new(self.ios_id, self.android_id)?;
        let config = Arc::new(self.config);
        let store = RatingStore::new(self.medium);
        let evaluator = Evaluator::new(config.thresholds());
        let flow = FlowController::new(
            Arc::clone(&config),
            self.callbacks,
            store.clone(),
            self.host.clone(),
            ids.clone(),
        );
        Ok(Requester {
            ids,
            config,
            evaluator,
            store,
            host: self.host,
            flow,
            initialized: OnceCell::new(),
            in_flight: Mutex::new(()),
        })
    }
}

/// Decides when to ask for an app-store rating and asks.
#[derive(Debug)]
pub struct Requester {
    ids: StoreIds,
    config: Arc<RatingConfig>,
    evaluator: Evaluator,
    store: RatingStore,
    host: Host,
    flow: FlowController,
    initialized: OnceCell<()>,
    in_flight: Mutex<()>,
}

impl Requester {
    /// Requester with the default configuration and no callbacks.
    pub fn new(
        ios_id: impl Into<String>,
        android_id: impl Into<String>,
        medium: Arc<dyn KeyValueMedium>,
        host: Host,
    ) -> Result<Self, ConfigError> {
        Self::builder(ios_id, android_id, medium, host).build()
    }

    pub fn builder(
        ios_id: impl Into<String>,
        android_id: impl Into<String>,
        medium: Arc<dyn KeyValueMedium>,
        host: Host,
    ) -> RequesterBuilder {
        RequesterBuilder {
            ios_id: ios_id.into(),
            android_id: android_id.into(),
            medium,
            host,
            config: RatingConfig::default(),
            callbacks: PromptCallbacks::default(),
        }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn store_ids(&self) -> &StoreIds {
        &self.ids
    }

    /// Direct access to the stored counters and timestamps.
    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    /// Record a generic use of the app, then maybe prompt.
    pub async fn handle_use(&self) -> Result<PromptOutcome, PresentationError> {
        self.bump(Counter::Uses).await;
        self.check_to_show_dialog().await
    }

    /// Record a positive interaction, then maybe prompt.
    pub async fn handle_positive_event(&self) -> Result<PromptOutcome, PresentationError> {
        self.bump(Counter::Events).await;
        self.check_to_show_dialog().await
    }

    /// Prompt if the user is eligible right now.
    pub async fn check_to_show_dialog(&self) -> Result<PromptOutcome, PresentationError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("rating prompt already in flight");
            return Ok(PromptOutcome::NotShown);
        };
        if !self.is_awaiting_rating().await {
            return Ok(PromptOutcome::NotShown);
        }
        self.flow.run().await
    }

    /// Prompt now, skipping the eligibility rules.
    ///
    /// Use sparingly, e.g. when the user goes looking for a way to rate.
    pub async fn show_rating_dialog(&self) -> Result<PromptOutcome, PresentationError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("rating prompt already in flight");
            return Ok(PromptOutcome::NotShown);
        };
        self.ensure_initialized().await;
        self.flow.run().await
    }

    /// Whether the stored state currently calls for a prompt. Unreadable
    /// state counts as "no".
    pub async fn is_awaiting_rating(&self) -> bool {
        match self.status().await {
            Ok(status) => status.report.is_eligible(),
            Err(e) => {
                warn!(error = %e, "could not read rating state, not prompting");
                false
            }
        }
    }

    /// Stored state plus the evaluator's verdict. Fails only when the medium
    /// itself cannot be read.
    pub async fn status(&self) -> Result<RatingStatus, StorageError> {
        self.ensure_initialized().await;
        let snapshot = self.store.snapshot().await?;
        let report = self.evaluator.explain(&snapshot, self.host.clock.now());
        debug!(?snapshot, ?report, "evaluated rating eligibility");
        Ok(RatingStatus { snapshot, report })
    }

    async fn bump(&self, counter: Counter) {
        self.ensure_initialized().await;
        match self.store.increment(counter).await {
            Ok(count) => debug!(%counter, count, "engagement recorded"),
            Err(e) => warn!(%counter, error = %e, "failed to record engagement"),
        }
    }

    async fn ensure_initialized(&self) {
        self.initialized
            .get_or_init(|| async {
                if let Err(e) = self.store.initialize().await {
                    warn!(error = %e, "failed to initialize rating counters");
                }
            })
            .await;
    }
}
