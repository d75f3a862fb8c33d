//! Configuration management for the helpdesk dashboard
//!
//! Every field has a default, so the dashboard runs with no configuration at
//! all: it reads `freshdesk_tickets6.json` from the working directory and
//! serves on `127.0.0.1:8501`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Ticket export configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Ticket export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the JSON export, relative to the working directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Number of rows in the detail table
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human readable lines
    #[default]
    Text,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8501
}

fn default_data_path() -> PathBuf {
    PathBuf::from("freshdesk_tickets6.json")
}

const fn default_recent_limit() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional `helpdesk.*` file and
    /// `HELPDESK__`-prefixed environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value is invalid.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("helpdesk").required(false))
            .add_source(
                config::Environment::with_prefix("HELPDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> crate::Result<()> {
        if self.data.recent_limit == 0 {
            return Err(crate::Error::Configuration {
                message: "data.recent_limit must be at least 1".to_string(),
            });
        }
        if self.data.path.as_os_str().is_empty() {
            return Err(crate::Error::Configuration {
                message: "data.path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// File name of the export, as shown in the remediation hint
    #[must_use]
    pub fn data_file_name(&self) -> String {
        self.data
            .path
            .file_name()
            .map_or_else(
                || self.data.path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            )
    }
}
