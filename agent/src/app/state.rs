//! Application state management

use std::sync::Arc;

use crate::app::options::AppOptions;
use crate::errors::MonitorError;
use crate::monitor::cycle::Monitor;
use crate::monitor::prober::Prober;
use crate::storage::observations::SqliteSink;
use crate::tuya::client::ApiClient;
use crate::tuya::sign::Signer;
use crate::tuya::token::TokenCache;

/// Main application state
pub struct AppState {
    /// Provider API client
    pub api_client: Arc<ApiClient>,

    /// Shared token cache
    pub token_cache: Arc<TokenCache>,

    /// Poll-cycle orchestrator
    pub monitor: Arc<Monitor>,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Arc<Self>, MonitorError> {
        let signer = Signer::new(options.client_id.clone(), options.client_secret.clone());
        let api_client = Arc::new(ApiClient::new(&options.provider_base_url, signer)?);

        let token_cache = Arc::new(TokenCache::new(
            api_client.clone(),
            options.token_fetch_deadline,
        ));

        let prober = Prober::new(
            api_client.clone(),
            token_cache.clone(),
            options.timeouts.clone(),
        );

        let sink = Arc::new(SqliteSink::open(&options.database_path)?);
        let monitor = Arc::new(Monitor::new(options.devices.clone(), prober, sink));

        Ok(Arc::new(Self {
            api_client,
            token_cache,
            monitor,
        }))
    }
}
