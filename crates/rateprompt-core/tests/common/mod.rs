//! Fake host collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rateprompt_core::{
    Alert, AlertPresenter, CallbackKind, Clock, Host, KeyValueMedium, NativeReview, Platform,
    PlatformError, PresentationError, PromptCallbacks, RatingConfig, Requester, UrlOpener,
};
use tokio::sync::Notify;

/// Answers alerts from a script of button indices.
#[derive(Default)]
pub struct ScriptedPresenter {
    answers: Mutex<VecDeque<usize>>,
    shown: Mutex<Vec<Alert>>,
    /// When set, each alert waits for a notification before answering.
    hold: Option<Arc<Notify>>,
}

impl ScriptedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding(gate: Arc<Notify>) -> Self {
        Self {
            hold: Some(gate),
            ..Self::default()
        }
    }

    pub fn answer(&self, index: usize) {
        self.answers.lock().unwrap().push_back(index);
    }

    pub fn shown(&self) -> Vec<Alert> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertPresenter for ScriptedPresenter {
    async fn present_choice(&self, alert: &Alert) -> Result<usize, PresentationError> {
        self.shown.lock().unwrap().push(alert.clone());
        if let Some(gate) = &self.hold {
            gate.notified().await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PresentationError::Failed("no scripted answer".into()))
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open_url(&self, url: &str) -> Result<(), PlatformError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct FakeReview {
    pub available: bool,
    pub fails: bool,
    requests: Mutex<usize>,
}

impl FakeReview {
    pub fn new(available: bool, fails: bool) -> Self {
        Self {
            available,
            fails,
            requests: Mutex::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        *self.requests.lock().unwrap()
    }
}

#[async_trait]
impl NativeReview for FakeReview {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_review(&self) -> Result<(), PlatformError> {
        *self.requests.lock().unwrap() += 1;
        if self.fails {
            Err(PlatformError::ReviewFailed("store sheet refused".into()))
        } else {
            Ok(())
        }
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Records every callback in the order it fired.
#[derive(Clone, Default)]
pub struct CallbackLog(Arc<Mutex<Vec<CallbackKind>>>);

impl CallbackLog {
    pub fn callbacks(&self) -> PromptCallbacks {
        let mut callbacks = PromptCallbacks::new();
        for kind in [
            CallbackKind::EnjoyingApp,
            CallbackKind::NotEnjoyingApp,
            CallbackKind::Accept,
            CallbackKind::Delay,
            CallbackKind::Decline,
        ] {
            let log = Arc::clone(&self.0);
            callbacks = callbacks.on(kind, move || log.lock().unwrap().push(kind));
        }
        callbacks
    }

    pub fn fired(&self) -> Vec<CallbackKind> {
        self.0.lock().unwrap().clone()
    }
}

/// A requester wired to fakes, with handles to inspect them.
pub struct Harness {
    pub requester: Requester,
    pub presenter: Arc<ScriptedPresenter>,
    pub opener: Arc<RecordingOpener>,
    pub clock: Arc<ManualClock>,
    pub log: CallbackLog,
}

pub struct HarnessBuilder {
    config: RatingConfig,
    platform: Platform,
    presenter: Arc<ScriptedPresenter>,
    review: Option<Arc<FakeReview>>,
}

impl HarnessBuilder {
    pub fn new(config: RatingConfig) -> Self {
        Self {
            config,
            platform: Platform::Ios,
            presenter: Arc::new(ScriptedPresenter::new()),
            review: None,
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn presenter(mut self, presenter: Arc<ScriptedPresenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn review(mut self, review: Arc<FakeReview>) -> Self {
        self.review = Some(review);
        self
    }

    pub fn build(self, medium: Arc<dyn KeyValueMedium>) -> Harness {
        let opener = Arc::new(RecordingOpener::default());
        let clock = Arc::new(ManualClock::new());
        let log = CallbackLog::default();

        let mut host = Host::new(self.platform, self.presenter.clone(), opener.clone())
            .with_clock(clock.clone());
        if let Some(review) = self.review {
            host = host.with_native_review(review);
        }

        let requester = Requester::builder("123456789", "com.example.app", medium, host)
            .config(self.config)
            .callbacks(log.callbacks())
            .build()
            .unwrap();

        Harness {
            requester,
            presenter: self.presenter,
            opener,
            clock,
            log,
        }
    }
}

/// Thresholds from the usage walkthrough: three of anything, remind after a day.
pub fn three_three_one() -> RatingConfig {
    RatingConfig {
        uses_until_prompt: 3,
        events_until_prompt: 3,
        days_before_reminding: 1,
        ..RatingConfig::default()
    }
}
