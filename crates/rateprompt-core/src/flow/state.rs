//! Prompt dialog state machine.
//!
//! Transitions are pure: they name the side effects to perform and leave
//! performing them to the [`FlowController`](super::FlowController).
//!
//! ```text
//! Idle -> EnjoyingGate -> StoreRatingGate -> Finished(Accepted | Delayed | Declined)
//!              \-> Finished(Declined)
//! ```
//!
//! Without the enjoying gate, `Idle` opens straight onto `StoreRatingGate`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stage of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// "Are you enjoying this app?"
    Enjoying,
    /// Rate now / remind me later / no thanks.
    StoreRating,
}

/// How one invocation of the flow ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromptOutcome {
    Accepted,
    Delayed,
    Declined { stage: Gate },
    /// Not eligible, or another prompt was already on screen.
    NotShown,
}

impl PromptOutcome {
    /// Did the user see a dialog at all?
    pub fn appeared(&self) -> bool {
        !matches!(self, PromptOutcome::NotShown)
    }
}

/// A button the user can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Enjoying,
    NotEnjoying,
    Accept,
    Delay,
    Decline,
}

/// Host hooks, one per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    EnjoyingApp,
    NotEnjoyingApp,
    Accept,
    Delay,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    RecordDeclined,
    RecordRated,
    /// Native review if the host has it, store URL otherwise.
    RequestReview,
    Invoke(CallbackKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum PromptState {
    Idle,
    EnjoyingGate,
    StoreRatingGate,
    Finished(PromptOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: PromptState,
    pub effects: Vec<Effect>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("choice {choice:?} is not valid in state {state:?}")]
pub struct InvalidTransition {
    pub state: PromptState,
    pub choice: Choice,
}

const ENJOYING_CHOICES: &[Choice] = &[Choice::Enjoying, Choice::NotEnjoying];
const STORE_RATING_CHOICES: &[Choice] = &[Choice::Accept, Choice::Delay, Choice::Decline];

impl PromptState {
    /// Leave `Idle` for the first gate.
    pub fn open(enjoying_gate: bool) -> Self {
        if enjoying_gate {
            PromptState::EnjoyingGate
        } else {
            PromptState::StoreRatingGate
        }
    }

    pub fn gate(&self) -> Option<Gate> {
        match self {
            PromptState::EnjoyingGate => Some(Gate::Enjoying),
            PromptState::StoreRatingGate => Some(Gate::StoreRating),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PromptState::Finished(_))
    }

    /// Choices offered in this state, in button order.
    pub fn choices(&self) -> &'static [Choice] {
        match self {
            PromptState::EnjoyingGate => ENJOYING_CHOICES,
            PromptState::StoreRatingGate => STORE_RATING_CHOICES,
            _ => &[],
        }
    }

    pub fn transition(self, choice: Choice) -> Result<Transition, InvalidTransition> {
        let (next, effects) = match (self, choice) {
            (PromptState::EnjoyingGate, Choice::Enjoying) => (
                PromptState::StoreRatingGate,
                vec![Effect::Invoke(CallbackKind::EnjoyingApp)],
            ),
            (PromptState::EnjoyingGate, Choice::NotEnjoying) => (
                PromptState::Finished(PromptOutcome::Declined {
                    stage: Gate::Enjoying,
                }),
                vec![
                    Effect::RecordDeclined,
                    Effect::Invoke(CallbackKind::NotEnjoyingApp),
                ],
            ),
            (PromptState::StoreRatingGate, Choice::Accept) => (
                PromptState::Finished(PromptOutcome::Accepted),
                vec![
                    Effect::RequestReview,
                    Effect::RecordRated,
                    Effect::Invoke(CallbackKind::Accept),
                ],
            ),
            (PromptState::StoreRatingGate, Choice::Delay) => (
                PromptState::Finished(PromptOutcome::Delayed),
                vec![Effect::Invoke(CallbackKind::Delay)],
            ),
            (PromptState::StoreRatingGate, Choice::Decline) => (
                PromptState::Finished(PromptOutcome::Declined {
                    stage: Gate::StoreRating,
                }),
                vec![Effect::RecordDeclined, Effect::Invoke(CallbackKind::Decline)],
            ),
            (state, choice) => return Err(InvalidTransition { state, choice }),
        };
        Ok(Transition { next, effects })
    }
}
