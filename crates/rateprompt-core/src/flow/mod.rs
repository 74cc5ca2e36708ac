mod controller;
mod state;
mod store_url;

pub use controller::FlowController;
pub use state::{
    CallbackKind, Choice, Effect, Gate, InvalidTransition, PromptOutcome, PromptState, Transition,
};
pub use store_url::StoreIds;
