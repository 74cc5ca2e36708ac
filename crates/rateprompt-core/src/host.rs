//! Collaborators supplied by the host application.
//!
//! The core never renders UI, opens links, or talks to the app stores on its
//! own. The host implements these traits on top of whatever its platform
//! offers and hands them to the [`Requester`](crate::Requester) inside a
//! [`Host`] bundle.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, PresentationError};

/// Mobile platform the host is running on. Selects the store review URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => f.write_str("ios"),
            Platform::Android => f.write_str("android"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Visual role of an alert button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Default,
    /// Marks the dismissive option.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertButton {
    pub label: String,
    #[serde(default)]
    pub style: ButtonStyle,
}

impl AlertButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: ButtonStyle::Default,
        }
    }

    pub fn cancel(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: ButtonStyle::Cancel,
        }
    }
}

/// A modal choice to put in front of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub buttons: Vec<AlertButton>,
}

/// Host modal/alert primitive.
///
/// Resolves once the user has picked a button, with the index of that button
/// in [`Alert::buttons`].
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    async fn present_choice(&self, alert: &Alert) -> Result<usize, PresentationError>;
}

/// Host URL-opening primitive.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open_url(&self, url: &str) -> Result<(), PlatformError>;
}

/// Host native "request in-app review" primitive.
#[async_trait]
pub trait NativeReview: Send + Sync {
    fn is_available(&self) -> bool;

    async fn request_review(&self) -> Result<(), PlatformError>;
}

/// Wall-clock source. Injected so eligibility and timestamps are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything the prompt flow needs from the host application.
#[derive(Clone)]
pub struct Host {
    pub platform: Platform,
    pub presenter: Arc<dyn AlertPresenter>,
    pub url_opener: Arc<dyn UrlOpener>,
    /// `None` when the platform has no native review API at all.
    pub native_review: Option<Arc<dyn NativeReview>>,
    pub clock: Arc<dyn Clock>,
}

impl Host {
    pub fn new(
        platform: Platform,
        presenter: Arc<dyn AlertPresenter>,
        url_opener: Arc<dyn UrlOpener>,
    ) -> Self {
        Self {
            platform,
            presenter,
            url_opener,
            native_review: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_native_review(mut self, review: Arc<dyn NativeReview>) -> Self {
        self.native_review = Some(review);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("platform", &self.platform)
            .field("native_review", &self.native_review.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_display() {
        for platform in [Platform::Ios, Platform::Android] {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("windows".parse::<Platform>().is_err());
    }

    #[test]
    fn cancel_button_is_styled() {
        assert_eq!(AlertButton::cancel("No").style, ButtonStyle::Cancel);
        assert_eq!(AlertButton::new("Yes").style, ButtonStyle::Default);
    }
}
