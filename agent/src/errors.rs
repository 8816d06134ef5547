//! Error types for the plugwatch agent

use thiserror::Error;

/// Main error type for the plugwatch agent
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    // Display text is part of the persisted error contract: offline
    // observations caused by a missed deadline carry exactly "Timeout".
    #[error("Timeout")]
    Timeout,

    #[error("Connection error")]
    ConnectionError,

    #[error("Token fetch failed: {0}")]
    TokenFetchFailed(String),

    #[error("Authentication rejected (code {code}): {msg}")]
    AuthRejected { code: i64, msg: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Provider error (code {code}): {msg}")]
    ProviderError { code: i64, msg: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No devices configured")]
    NoDevices,
}

impl MonitorError {
    /// Whether the provider answered with an auth-rejection envelope,
    /// i.e. the cached token must be discarded before a retry.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, MonitorError::AuthRejected { .. })
    }
}
