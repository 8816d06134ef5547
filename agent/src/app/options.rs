//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::config::settings::{Device, Settings};
use crate::monitor::prober::ProbeTimeouts;
use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Provider API base URL
    pub provider_base_url: String,

    /// Client identifier of the credential pair
    pub client_id: String,

    /// Secret key of the credential pair
    pub client_secret: SecretString,

    /// Devices probed each cycle
    pub devices: Vec<Device>,

    /// Path of the sqlite observation store
    pub database_path: PathBuf,

    /// Per-call probe deadlines
    pub timeouts: ProbeTimeouts,

    /// Deadline for token issuance calls
    pub token_fetch_deadline: Duration,

    /// Enable local HTTP server
    pub enable_server: bool,

    /// Enable the periodic poll worker
    pub enable_poller: bool,

    /// Server configuration
    pub server: ServerOptions,

    /// Poller worker options
    pub poller: poller::Options,
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            provider_base_url: settings.provider.base_url.clone(),
            client_id: settings.provider.client_id.clone(),
            client_secret: settings.provider.client_secret.clone(),
            devices: settings.devices.clone(),
            database_path: PathBuf::from(&settings.database_path),
            timeouts: ProbeTimeouts {
                metadata: Duration::from_secs(settings.metadata_timeout_secs),
                status: Duration::from_secs(settings.status_timeout_secs),
            },
            // Token issuance shares the status-call budget
            token_fetch_deadline: Duration::from_secs(settings.status_timeout_secs),
            enable_server: settings.enable_server,
            enable_poller: settings.enable_poller,
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            poller: poller::Options {
                interval: Duration::from_secs(settings.poll_interval_secs),
                ..Default::default()
            },
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8450,
        }
    }
}
