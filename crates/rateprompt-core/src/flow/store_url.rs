//! App store identifiers and review URLs.

use crate::error::ConfigError;
use crate::host::Platform;

/// Validated pair of store identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreIds {
    ios: String,
    android: String,
}

impl StoreIds {
    /// Both identifiers must be non-blank.
    pub fn new(ios: impl Into<String>, android: impl Into<String>) -> Result<Self, ConfigError> {
        let ios = ios.into().trim().to_string();
        let android = android.into().trim().to_string();
        if ios.is_empty() {
            return Err(ConfigError::MissingStoreId(Platform::Ios));
        }
        if android.is_empty() {
            return Err(ConfigError::MissingStoreId(Platform::Android));
        }
        Ok(Self { ios, android })
    }

    pub fn ios(&self) -> &str {
        &self.ios
    }

    pub fn android(&self) -> &str {
        &self.android
    }

    /// Where to send the user to leave a review on `platform`.
    pub fn review_url(&self, platform: Platform) -> String {
        match platform {
            Platform::Ios => format!(
                "http://itunes.apple.com/WebObjects/MZStore.woa/wa/viewContentsUserReviews?id={}&pageNumber=0&sortOrdering=2&type=Purple+Software&mt=8",
                self.ios
            ),
            Platform::Android => format!("market://details?id={}", self.android),
        }
    }
}
