use clap::Subcommand;
use rateprompt_core::error::Result;
use rateprompt_core::{ConfigError, RatingConfig};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "uses_until_prompt", "action_labels.accept")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = RatingConfig::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        message: "unknown key".into(),
                    }
                    .into())
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = RatingConfig::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = RatingConfig::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = RatingConfig::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
