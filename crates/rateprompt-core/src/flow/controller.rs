//! Drives one rating dialog from its first gate to a terminal outcome.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::state::{Choice, Effect, Gate, PromptOutcome, PromptState, Transition};
use super::store_url::StoreIds;
use crate::callbacks::PromptCallbacks;
use crate::error::{PlatformError, PresentationError};
use crate::host::{Alert, AlertButton, Host};
use crate::storage::RatingConfig;
use crate::store::RatingStore;

/// Interprets [`PromptState`] transitions against the store and the host.
#[derive(Debug, Clone)]
pub struct FlowController {
    config: Arc<RatingConfig>,
    callbacks: PromptCallbacks,
    store: RatingStore,
    host: Host,
    ids: StoreIds,
}

impl FlowController {
    pub fn new(
        config: Arc<RatingConfig>,
        callbacks: PromptCallbacks,
        store: RatingStore,
        host: Host,
        ids: StoreIds,
    ) -> Self {
        Self {
            config,
            callbacks,
            store,
            host,
            ids,
        }
    }

    /// Show the dialog and wait for the user to finish with it.
    ///
    /// Marks the prompt as seen before anything is presented and resets both
    /// counters once the outcome is known. A presentation failure returns
    /// early and leaves the counters as they were.
    pub async fn run(&self) -> Result<PromptOutcome, PresentationError> {
        if let Err(e) = self.store.record_seen(self.host.clock.now()).await {
            warn!(error = %e, "failed to record prompt as seen");
        }

        let mut state = PromptState::open(self.config.enjoying_gate);
        let outcome = loop {
            if let PromptState::Finished(outcome) = state {
                break outcome;
            }

            let choice = self.ask(state).await?;
            let Transition { next, effects } = state
                .transition(choice)
                .map_err(|e| PresentationError::Failed(e.to_string()))?;
            debug!(?state, ?choice, ?next, "prompt transition");
            for effect in effects {
                self.apply(effect).await;
            }
            state = next;
        };

        if let Err(e) = self.store.reset_counters().await {
            warn!(error = %e, "failed to reset engagement counters");
        }
        info!(?outcome, "rating prompt finished");
        Ok(outcome)
    }

    /// Build the alert for a gate state.
    pub fn alert_for(&self, state: PromptState) -> Alert {
        let cfg = &self.config;
        let buttons = state
            .choices()
            .iter()
            .map(|choice| match choice {
                Choice::Enjoying => AlertButton::new(&cfg.enjoying_actions.accept),
                Choice::NotEnjoying => AlertButton::cancel(&cfg.enjoying_actions.decline),
                Choice::Accept => AlertButton::new(&cfg.action_labels.accept),
                Choice::Delay => AlertButton::new(&cfg.action_labels.delay),
                Choice::Decline => AlertButton::cancel(&cfg.action_labels.decline),
            })
            .collect();
        let message = match state.gate() {
            Some(Gate::Enjoying) => cfg.enjoying_message.clone(),
            _ => cfg.message.clone(),
        };
        Alert {
            title: cfg.title.clone(),
            message,
            buttons,
        }
    }

    async fn ask(&self, state: PromptState) -> Result<Choice, PresentationError> {
        let alert = self.alert_for(state);
        let index = self.host.presenter.present_choice(&alert).await?;
        let choices = state.choices();
        choices
            .get(index)
            .copied()
            .ok_or(PresentationError::InvalidChoice {
                index,
                buttons: choices.len(),
            })
    }

    async fn apply(&self, effect: Effect) {
        match effect {
            Effect::RecordDeclined => {
                if let Err(e) = self.store.record_declined(self.host.clock.now()).await {
                    warn!(error = %e, "failed to record decline");
                }
            }
            Effect::RecordRated => {
                if let Err(e) = self.store.record_rated(self.host.clock.now()).await {
                    warn!(error = %e, "failed to record rating");
                }
            }
            Effect::RequestReview => self.request_review().await,
            Effect::Invoke(kind) => self.callbacks.invoke(kind),
        }
    }

    /// Native review when the host offers it, the store page otherwise.
    async fn request_review(&self) {
        match self.native_review().await {
            Ok(()) => return,
            Err(PlatformError::ReviewUnavailable) => {
                debug!("native review unavailable, opening store page")
            }
            Err(e) => warn!(error = %e, "native review failed, opening store page"),
        }

        let url = self.ids.review_url(self.host.platform);
        if let Err(e) = self.host.url_opener.open_url(&url).await {
            warn!(error = %e, %url, "failed to open store review page");
        }
    }

    async fn native_review(&self) -> Result<(), PlatformError> {
        match &self.host.native_review {
            Some(review) if review.is_available() => review.request_review().await,
            _ => Err(PlatformError::ReviewUnavailable),
        }
    }
}
