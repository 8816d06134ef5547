//! Signed HTTP client for the provider device API
//!
//! Every endpoint answers with the same envelope, success or not:
//! `{ success, code, msg, result, t }`. Network-level failures are
//! classified into `Timeout` / `ConnectionError` here so callers only
//! ever see the error taxonomy, never raw reqwest errors for those
//! two cases.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MonitorError;
use crate::tuya::sign::Signer;
use crate::tuya::{is_auth_rejection, CODE_RATE_LIMITED};

/// Response envelope shared by all provider endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,

    #[serde(default)]
    pub code: Option<i64>,

    #[serde(default)]
    pub msg: Option<String>,

    #[serde(default)]
    pub result: Option<T>,

    /// Server-side epoch milliseconds
    #[serde(default)]
    pub t: Option<i64>,
}

impl<T> ApiEnvelope<T> {
    /// Collapse the envelope into the error taxonomy.
    pub fn into_result(self) -> Result<T, MonitorError> {
        if self.success {
            return self.result.ok_or(MonitorError::ProviderError {
                code: 0,
                msg: "success envelope without result".to_string(),
            });
        }

        let code = self.code.unwrap_or(0);
        let msg = self.msg.unwrap_or_default();

        if is_auth_rejection(code) {
            Err(MonitorError::AuthRejected { code, msg })
        } else if code == CODE_RATE_LIMITED {
            Err(MonitorError::RateLimited)
        } else {
            Err(MonitorError::ProviderError { code, msg })
        }
    }
}

/// Token issuance result
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,

    /// Remaining lifetime in seconds
    pub expire_time: u64,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub uid: Option<String>,
}

/// Device metadata as reported by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Explicit reachability flag; absent on some firmware versions
    #[serde(default)]
    pub online: Option<bool>,

    #[serde(default)]
    pub category: Option<String>,
}

/// One code/value telemetry pair from the status endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StatusItem {
    pub code: String,

    #[serde(default)]
    pub value: serde_json::Value,
}

/// HTTP client for the provider API
pub struct ApiClient {
    client: Client,
    base_url: String,
    signer: Signer,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// No client-wide timeout is set; every call carries its own
    /// deadline so metadata and status probes can be bounded
    /// independently.
    pub fn new(base_url: &str, signer: Signer) -> Result<Self, MonitorError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a signed GET request, bounded by `deadline`.
    pub async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
        deadline: Duration,
    ) -> Result<ApiEnvelope<T>, MonitorError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let timestamp = Signer::timestamp();
        let signature = self.signer.sign("GET", path, query, "", token, &timestamp);

        let mut request = self
            .client
            .get(&url)
            .header("client_id", self.signer.client_id())
            .header("sign", signature)
            .header("sign_method", "HMAC-SHA256")
            .header("t", timestamp);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.header("access_token", token);
        }

        let response = tokio::time::timeout(deadline, async {
            let response = request.send().await.map_err(classify_transport_error)?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(MonitorError::ProviderError {
                    code: i64::from(status.as_u16()),
                    msg: body,
                });
            }

            response
                .json::<ApiEnvelope<T>>()
                .await
                .map_err(classify_transport_error)
        })
        .await
        .map_err(|_| MonitorError::Timeout)??;

        Ok(response)
    }

    /// Fetch a fresh bearer token.
    pub async fn fetch_token(&self, deadline: Duration) -> Result<TokenGrant, MonitorError> {
        self.get_signed::<TokenGrant>("/v1.0/token", &[("grant_type", "1")], None, deadline)
            .await?
            .into_result()
    }

    /// Fetch device metadata.
    pub async fn device_info(
        &self,
        device_id: &str,
        token: &str,
        deadline: Duration,
    ) -> Result<DeviceInfo, MonitorError> {
        self.get_signed::<DeviceInfo>(
            &format!("/v1.0/devices/{device_id}"),
            &[],
            Some(token),
            deadline,
        )
        .await?
        .into_result()
    }

    /// Fetch the device status telemetry list.
    pub async fn device_status(
        &self,
        device_id: &str,
        token: &str,
        deadline: Duration,
    ) -> Result<Vec<StatusItem>, MonitorError> {
        self.get_signed::<Vec<StatusItem>>(
            &format!("/v1.0/devices/{device_id}/status"),
            &[],
            Some(token),
            deadline,
        )
        .await?
        .into_result()
    }
}

/// Fold transport-level failures into the error taxonomy; anything
/// that is neither a timeout nor a connect failure stays a plain HTTP
/// error.
fn classify_transport_error(err: reqwest::Error) -> MonitorError {
    if err.is_timeout() {
        MonitorError::Timeout
    } else if err.is_connect() {
        MonitorError::ConnectionError
    } else {
        MonitorError::HttpError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_into_result() {
        let env = ApiEnvelope {
            success: true,
            code: None,
            msg: None,
            result: Some(42),
            t: Some(1700000000000),
        };
        assert_eq!(env.into_result().unwrap(), 42);
    }

    #[test]
    fn test_envelope_auth_rejection() {
        let env: ApiEnvelope<i32> = ApiEnvelope {
            success: false,
            code: Some(1010),
            msg: Some("token invalid".to_string()),
            result: None,
            t: None,
        };
        assert!(env.into_result().unwrap_err().is_auth_rejection());
    }

    #[test]
    fn test_envelope_rate_limited() {
        let env: ApiEnvelope<i32> = ApiEnvelope {
            success: false,
            code: Some(1013),
            msg: Some("request frequency exceeded".to_string()),
            result: None,
            t: None,
        };
        assert!(matches!(
            env.into_result().unwrap_err(),
            MonitorError::RateLimited
        ));
    }

    #[test]
    fn test_envelope_other_failure_keeps_provider_message() {
        let env: ApiEnvelope<i32> = ApiEnvelope {
            success: false,
            code: Some(1106),
            msg: Some("permission denied".to_string()),
            result: None,
            t: None,
        };
        match env.into_result().unwrap_err() {
            MonitorError::ProviderError { code, msg } => {
                assert_eq!(code, 1106);
                assert_eq!(msg, "permission denied");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
