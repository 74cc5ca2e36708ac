//! TOML-based prompt configuration.
//!
//! Holds everything about the rating prompt that a host may want to tune:
//! - Texts and button labels for both dialog stages
//! - Thresholds feeding the eligibility rules
//! - The terminal-outcome policy and the debug override
//! - Store identifiers, for hosts (like the CLI) that keep them on disk
//!
//! Configuration is stored at `<data_dir>/config.toml`. Once handed to a
//! [`Requester`](crate::Requester) it is frozen behind an `Arc`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::eligibility::{TerminalPolicy, Thresholds};
use crate::error::ConfigError;

/// Button labels for the store-rating stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLabels {
    #[serde(default = "default_accept_label")]
    pub accept: String,
    #[serde(default = "default_delay_label")]
    pub delay: String,
    #[serde(default = "default_decline_label")]
    pub decline: String,
}

/// Button labels for the "are you enjoying this app?" stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnjoyingActions {
    #[serde(default = "default_enjoying_accept")]
    pub accept: String,
    #[serde(default = "default_enjoying_decline")]
    pub decline: String,
}

/// Store identifiers as kept in the config file.
///
/// Blank by default; the [`Requester`](crate::Requester) refuses to start
/// until both are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdsConfig {
    #[serde(default)]
    pub ios: String,
    #[serde(default)]
    pub android: String,
}

/// Rating prompt configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Title of the store-rating confirmation.
    #[serde(default = "default_title")]
    pub title: String,
    /// Body of the store-rating confirmation.
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default)]
    pub action_labels: ActionLabels,
    /// Ask "are you enjoying this app?" before the store-rating stage.
    #[serde(default = "default_true")]
    pub enjoying_gate: bool,
    #[serde(default = "default_enjoying_message")]
    pub enjoying_message: String,
    #[serde(default)]
    pub enjoying_actions: EnjoyingActions,
    #[serde(default = "default_one")]
    pub events_until_prompt: u64,
    #[serde(default = "default_one")]
    pub uses_until_prompt: u64,
    #[serde(default = "default_one")]
    pub days_before_reminding: u64,
    /// Always eligible. For trying the dialog out by hand.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub terminal_policy: TerminalPolicy,
    /// Treat a prompt that was never shown as shown infinitely long ago.
    #[serde(default)]
    pub remind_when_never_shown: bool,
    #[serde(default)]
    pub store_ids: StoreIdsConfig,
}

// Default functions
fn default_title() -> String {
    "Rate Me".into()
}
fn default_message() -> String {
    "We hope you're loving our app. If you are, would you mind taking a quick moment to leave us a positive review?".into()
}
fn default_accept_label() -> String {
    "Rate".into()
}
fn default_delay_label() -> String {
    "Remind me later".into()
}
fn default_decline_label() -> String {
    "No, thanks".into()
}
fn default_enjoying_message() -> String {
    "Are you enjoying this app?".into()
}
fn default_enjoying_accept() -> String {
    "Yes!".into()
}
fn default_enjoying_decline() -> String {
    "Not really".into()
}
fn default_true() -> bool {
    true
}
fn default_one() -> u64 {
    1
}

impl Default for ActionLabels {
    fn default() -> Self {
        Self {
            accept: default_accept_label(),
            delay: default_delay_label(),
            decline: default_decline_label(),
        }
    }
}

impl Default for EnjoyingActions {
    fn default() -> Self {
        Self {
            accept: default_enjoying_accept(),
            decline: default_enjoying_decline(),
        }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            message: default_message(),
            action_labels: ActionLabels::default(),
            enjoying_gate: true,
            enjoying_message: default_enjoying_message(),
            enjoying_actions: EnjoyingActions::default(),
            events_until_prompt: 1,
            uses_until_prompt: 1,
            days_before_reminding: 1,
            debug: false,
            terminal_policy: TerminalPolicy::default(),
            remind_when_never_shown: false,
            store_ids: StoreIdsConfig::default(),
        }
    }
}

impl RatingConfig {
    /// The subset of the configuration the eligibility rules read.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            uses_until_prompt: self.uses_until_prompt,
            events_until_prompt: self.events_until_prompt,
            days_before_reminding: self.days_before_reminding,
            debug: self.debug,
            terminal_policy: self.terminal_policy,
            remind_when_never_shown: self.remind_when_never_shown,
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_texts() {
        let cfg = RatingConfig::default();
        assert_eq!(cfg.title, "Rate Me");
        assert_eq!(cfg.action_labels.delay, "Remind me later");
        assert_eq!(cfg.uses_until_prompt, 1);
        assert_eq!(cfg.terminal_policy, TerminalPolicy::BothTerminal);
        assert!(!cfg.debug);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: RatingConfig = toml::from_str(
            r#"
            events_until_prompt = 3
            terminal_policy = "either-terminal"

            [action_labels]
            accept = "Sure"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.events_until_prompt, 3);
        assert_eq!(cfg.uses_until_prompt, 1);
        assert_eq!(cfg.terminal_policy, TerminalPolicy::EitherTerminal);
        assert_eq!(cfg.action_labels.accept, "Sure");
        assert_eq!(cfg.action_labels.decline, "No, thanks");
    }

    #[test]
    fn get_and_set_by_dotted_key() {
        let mut cfg = RatingConfig::default();
        cfg.set("action_labels.delay", "Later").unwrap();
        cfg.set("uses_until_prompt", "5").unwrap();
        cfg.set("debug", "true").unwrap();
        cfg.set("terminal_policy", "either-terminal").unwrap();
        assert_eq!(cfg.get("action_labels.delay").as_deref(), Some("Later"));
        assert_eq!(cfg.get("uses_until_prompt").as_deref(), Some("5"));
        assert!(cfg.debug);
        assert_eq!(cfg.terminal_policy, TerminalPolicy::EitherTerminal);
    }

    #[test]
    fn set_rejects_unknown_and_mistyped() {
        let mut cfg = RatingConfig::default();
        assert!(cfg.set("nope", "1").is_err());
        assert!(cfg.set("uses_until_prompt", "-3").is_err());
        assert!(cfg.set("terminal_policy", "sometimes").is_err());
        assert_eq!(cfg, RatingConfig::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = RatingConfig::load_from(&path).unwrap();
        assert_eq!(cfg, RatingConfig::default());
        assert!(path.exists());

        let mut edited = cfg.clone();
        edited.store_ids.ios = "123456789".into();
        edited.save_to(&path).unwrap();
        assert_eq!(RatingConfig::load_from(&path).unwrap(), edited);
    }
}
