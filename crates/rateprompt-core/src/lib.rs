//! # Rateprompt Core Library
//!
//! This library decides, from a user's accumulated in-app engagement, when to
//! ask for an app-store rating, and walks the user through the resulting
//! dialog. It is embedded in a host application which supplies the UI, link
//! opening, native review, and persistence primitives.
//!
//! ## Architecture
//!
//! - **Store**: typed counters and timestamps over a flat key-value medium
//!   (SQLite or in-memory), using the key layout of earlier installs
//! - **Eligibility**: a pure OR-of-thresholds rule over the stored state
//! - **Flow**: a two-gate dialog state machine whose effects are applied
//!   against the store and the host
//! - **Requester**: the façade hosts call on every use or positive event
//!
//! ## Key Components
//!
//! - [`Requester`]: Entry points `handle_use`, `handle_positive_event`,
//!   `check_to_show_dialog`, `show_rating_dialog`
//! - [`RatingStore`]: Counter/timestamp persistence
//! - [`Evaluator`]: Eligibility decision
//! - [`FlowController`]: Dialog sequencing
//! - [`RatingConfig`]: Prompt configuration

pub mod callbacks;
pub mod eligibility;
pub mod error;
pub mod flow;
pub mod host;
pub mod requester;
pub mod storage;
pub mod store;

pub use callbacks::PromptCallbacks;
pub use eligibility::{
    EligibilityReport, Evaluator, Ineligible, TerminalPolicy, Thresholds, Trigger,
};
pub use error::{ConfigError, CoreError, PlatformError, PresentationError, StorageError};
pub use flow::{CallbackKind, Choice, FlowController, Gate, PromptOutcome, PromptState, StoreIds};
pub use host::{
    Alert, AlertButton, AlertPresenter, ButtonStyle, Clock, Host, NativeReview, Platform,
    SystemClock, UrlOpener,
};
pub use requester::{RatingStatus, Requester, RequesterBuilder};
pub use storage::{KeyValueMedium, MemoryMedium, RatingConfig, SqliteMedium};
pub use store::{Counter, EngagementSnapshot, PromptTimestamps, RatingStore};
