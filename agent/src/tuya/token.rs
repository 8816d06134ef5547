//! Bearer token cache
//!
//! Holds the single provider token for the process and refreshes it
//! lazily. The mutex is held across the refresh fetch, so concurrent
//! probes asking for a token while a refresh is in flight wait for
//! that one fetch instead of issuing their own.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::MonitorError;
use crate::tuya::client::ApiClient;

/// Refresh this long before the provider-reported expiry.
pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(300);

/// A token plus the instant after which it must not be handed out.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Build from a grant, applying the safety margin up front so the
    /// freshness check stays a plain comparison.
    pub fn from_grant(access_token: String, lifetime_secs: u64, now: DateTime<Utc>) -> Self {
        let expires_at = now + ChronoDuration::seconds(lifetime_secs as i64)
            - ChronoDuration::seconds(TOKEN_SAFETY_MARGIN.as_secs() as i64);
        Self {
            access_token,
            expires_at,
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-wide token cache
pub struct TokenCache {
    client: Arc<ApiClient>,
    fetch_deadline: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(client: Arc<ApiClient>, fetch_deadline: Duration) -> Self {
        Self {
            client,
            fetch_deadline,
            cached: Mutex::new(None),
        }
    }

    /// Get a token that is not past its refresh watermark.
    ///
    /// `force_refresh` skips the cache entirely; used after the
    /// provider rejects a token we believed was still good.
    pub async fn get_token(&self, force_refresh: bool) -> Result<String, MonitorError> {
        let mut cached = self.cached.lock().await;

        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                if token.is_fresh_at(Utc::now()) {
                    return Ok(token.access_token.clone());
                }
                debug!("Cached token is past its refresh watermark");
            }
        }

        // Empty state until the fetch succeeds
        *cached = None;

        match self.client.fetch_token(self.fetch_deadline).await {
            Ok(grant) => {
                let token =
                    CachedToken::from_grant(grant.access_token, grant.expire_time, Utc::now());
                info!("Fetched provider token, refresh due at {}", token.expires_at);

                let access_token = token.access_token.clone();
                *cached = Some(token);
                Ok(access_token)
            }
            Err(e) => {
                warn!("Token fetch failed: {}", e);
                Err(MonitorError::TokenFetchFailed(e.to_string()))
            }
        }
    }

    /// Drop the cached token; the next `get_token` fetches a new one.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        *cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_fresh_within_margin_adjusted_lifetime() {
        let now = Utc::now();
        let token = CachedToken::from_grant("tok".to_string(), 7200, now);

        assert!(token.is_fresh_at(now));
        assert!(token.is_fresh_at(now + ChronoDuration::seconds(6899)));
        assert!(!token.is_fresh_at(now + ChronoDuration::seconds(6900)));
        assert!(!token.is_fresh_at(now + ChronoDuration::seconds(7200)));
    }

    #[test]
    fn test_short_lifetime_is_stale_immediately() {
        // Lifetime shorter than the safety margin never validates
        let now = Utc::now();
        let token = CachedToken::from_grant("tok".to_string(), 120, now);
        assert!(!token.is_fresh_at(now));
    }
}
