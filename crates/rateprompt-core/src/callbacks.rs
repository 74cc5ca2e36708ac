//! Host hooks fired as the dialog moves between stages.

use std::fmt;
use std::sync::Arc;

use crate::flow::CallbackKind;

type Hook = Arc<dyn Fn() + Send + Sync>;

/// Optional hooks, one per [`CallbackKind`].
///
/// Hooks run synchronously on the task driving the dialog; keep them short.
#[derive(Clone, Default)]
pub struct PromptCallbacks {
    enjoying_app: Option<Hook>,
    not_enjoying_app: Option<Hook>,
    accept: Option<Hook>,
    delay: Option<Hook>,
    decline: Option<Hook>,
}

impl PromptCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for `kind`, replacing any earlier one.
    pub fn on(mut self, kind: CallbackKind, hook: impl Fn() + Send + Sync + 'static) -> Self {
        *self.slot_mut(kind) = Some(Arc::new(hook));
        self
    }

    pub fn on_enjoying_app(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on(CallbackKind::EnjoyingApp, hook)
    }

    pub fn on_not_enjoying_app(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on(CallbackKind::NotEnjoyingApp, hook)
    }

    pub fn on_accept(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on(CallbackKind::Accept, hook)
    }

    pub fn on_delay(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on(CallbackKind::Delay, hook)
    }

    pub fn on_decline(self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on(CallbackKind::Decline, hook)
    }

    pub fn is_set(&self, kind: CallbackKind) -> bool {
        self.slot(kind).is_some()
    }

    pub(crate) fn invoke(&self, kind: CallbackKind) {
        if let Some(hook) = self.slot(kind) {
            hook();
        }
    }

    fn slot(&self, kind: CallbackKind) -> &Option<Hook> {
        match kind {
            CallbackKind::EnjoyingApp => &self.enjoying_app,
            CallbackKind::NotEnjoyingApp => &self.not_enjoying_app,
            CallbackKind::Accept => &self.accept,
            CallbackKind::Delay => &self.delay,
            CallbackKind::Decline => &self.decline,
        }
    }

    fn slot_mut(&mut self, kind: CallbackKind) -> &mut Option<Hook> {
        match kind {
            CallbackKind::EnjoyingApp => &mut self.enjoying_app,
            CallbackKind::NotEnjoyingApp => &mut self.not_enjoying_app,
            CallbackKind::Accept => &mut self.accept,
            CallbackKind::Delay => &mut self.delay,
            CallbackKind::Decline => &mut self.decline,
        }
    }
}

impl fmt::Debug for PromptCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptCallbacks")
            .field("enjoying_app", &self.enjoying_app.is_some())
            .field("not_enjoying_app", &self.not_enjoying_app.is_some())
            .field("accept", &self.accept.is_some())
            .field("delay", &self.delay.is_some())
            .field("decline", &self.decline.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn invokes_only_the_registered_hook() {
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        let callbacks = PromptCallbacks::new().on_accept(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        callbacks.invoke(CallbackKind::Decline);
        callbacks.invoke(CallbackKind::Accept);

        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        assert!(callbacks.is_set(CallbackKind::Accept));
        assert!(!callbacks.is_set(CallbackKind::Delay));
    }
}
