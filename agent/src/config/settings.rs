//! Settings file management

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::errors::MonitorError;
use crate::logs::LogLevel;

/// A monitored smart plug: stable provider id plus a human label.
/// The set is fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

/// Agent settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cloud provider configuration
    pub provider: ProviderSettings,

    /// Devices to probe each cycle
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Path of the sqlite observation store
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable local HTTP server
    #[serde(default = "default_true")]
    pub enable_server: bool,

    /// Enable the periodic poll worker
    #[serde(default = "default_true")]
    pub enable_poller: bool,

    /// Poll interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Deadline for the metadata call, per device
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,

    /// Deadline for the status call, per device. Longer than the
    /// metadata deadline since the status call decides the verdict.
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// Local HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> String {
    "/var/lib/plugwatch/observations.db".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_metadata_timeout() -> u64 {
    5
}

fn default_status_timeout() -> u64 {
    10
}

/// Cloud provider API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider's OpenAPI gateway
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client identifier of the credential pair
    pub client_id: String,

    /// Secret key of the credential pair; never logged or re-serialized
    pub client_secret: SecretString,
}

fn default_base_url() -> String {
    "https://openapi.tuyaeu.com".to_string()
}

/// Local HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8450
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.provider.client_id.is_empty() {
            return Err(MonitorError::ConfigError(
                "provider.client_id must not be empty".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::ConfigError(
                "poll_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
