//! # Appkit Configuration
//!
//! - [`ConfigData`]: untyped key/value parameters handed to an app when it is
//!   constructed (its init params), with typed accessors.
//! - [`HostConfig`]: host settings (registration policy, log level, per-app
//!   init params), loadable from JSON, TOML or YAML files.
//! - [`ConfigFormat`]: file format detection by extension.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::RegistrationPolicy;
use crate::kernel::constants::DEFAULT_LOG_LEVEL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported config format for path: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to serialize to {format}: {message}")]
    Serialization { format: &'static str, message: String },

    #[error("Failed to deserialize from {format}: {message}")]
    Deserialization { format: &'static str, message: String },
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ConfigError> {
        let format = self.extension();
        let encoded = match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| ConfigError::Serialization { format, message })
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self, data: &str) -> Result<T, ConfigError> {
        let format = self.extension();
        let decoded = match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| ConfigError::Deserialization { format, message })
    }
}

/// In-memory representation of configuration data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get a configuration value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let json_value = serde_json::to_value(value).map_err(|e| ConfigError::Serialization {
            format: "json",
            message: e.to_string(),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        format.encode(self)
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        format.decode(data)
    }
}

impl Default for ConfigData {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Reject duplicate service identifiers instead of overwriting them.
    pub strict_registration: bool,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Init params per app id.
    pub apps: HashMap<String, ConfigData>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            strict_registration: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            apps: HashMap::new(),
        }
    }
}

impl HostConfig {
    /// Load host settings from `path`; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HostConfig = format.decode(&data)?;
        log::debug!("Loaded host configuration from {}", path.display());
        Ok(config)
    }

    pub fn registration_policy(&self) -> RegistrationPolicy {
        RegistrationPolicy::from_strict(self.strict_registration)
    }

    /// Init params configured for `app_id`, empty when none are set.
    pub fn app_params(&self, app_id: &str) -> ConfigData {
        self.apps.get(app_id).cloned().unwrap_or_default()
    }
}
