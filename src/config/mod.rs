//! Configuration module.
//!
//! Handles named connections, wizard defaults, store location and logging.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, LoggingSettings, Settings, SettingsError, SettingsResult,
    StoreSettings, WizardSettings, CONFIG_ENV_VAR,
};
