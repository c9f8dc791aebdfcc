//! TOML-based configuration.
//!
//! Supports a config file (`multitable.toml`) with environment variable
//! expansion in connection strings and the store path.
//!
//! Example configuration:
//! ```toml
//! [connections.sales]
//! driver = "json"
//! connection_string = "${DATA_DIR}/sales.json"
//! default_schema = "sales"
//!
//! [wizard]
//! star_modeling = true
//! restore_saved = true
//!
//! [store]
//! path = "$HOME/.multitable/datasources.db"
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::metadata::ConnectionInfo;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MULTITABLE_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Malformed environment variable reference in '{0}'")]
    InvalidEnvVarReference(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Join wizard behaviour.
    pub wizard: WizardSettings,

    /// Datasource store location.
    pub store: StoreSettings,

    /// Log output.
    pub logging: LoggingSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Schema provider driver (json).
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Schema picked when the connection is opened.
    #[serde(default)]
    pub default_schema: Option<String>,
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> SettingsResult<String> {
        expand_env_vars(&self.connection_string)
    }

    /// Build the runtime connection descriptor named `name`.
    pub fn to_connection(&self, name: &str) -> SettingsResult<ConnectionInfo> {
        let mut info = ConnectionInfo::new(name, &self.driver, self.resolved_connection_string()?);
        if let Some(schema) = &self.default_schema {
            info = info.with_default_schema(schema);
        }
        Ok(info)
    }
}

/// Join wizard settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WizardSettings {
    /// Require a fact table (OLAP star schema).
    pub star_modeling: bool,

    /// Restore a previously committed configuration when one exists.
    pub restore_saved: bool,
}

/// Datasource store settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Store database path; the home directory default when unset.
    pub path: Option<String>,
}

impl StoreSettings {
    pub fn resolved_path(&self) -> SettingsResult<Option<PathBuf>> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `MULTITABLE_CONFIG`
    /// 2. `./multitable.toml`
    /// 3. `<config dir>/multitable/config.toml`
    pub fn load() -> SettingsResult<Self> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("multitable.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("multitable").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> SettingsResult<&ConnectionSettings> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Resolve a named connection into its runtime descriptor.
    pub fn connection_info(&self, name: &str) -> SettingsResult<ConnectionInfo> {
        self.get_connection(name)?.to_connection(name)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is
/// kept as is. An empty `${}` or an unclosed `${VAR` is an error.
pub fn expand_env_vars(s: &str) -> SettingsResult<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let name: String = if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                name.push(ch);
            }
            if chars.next().is_none() || name.is_empty() {
                return Err(SettingsError::InvalidEnvVarReference(s.to_string()));
            }
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&name).map_err(|_| SettingsError::MissingEnvVar(name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
