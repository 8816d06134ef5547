//! Device prober
//!
//! `probe` never fails: every failure mode folds into an offline
//! observation with a reason, so one misbehaving device can never take
//! down a poll cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::settings::Device;
use crate::monitor::observation::Observation;
use crate::tuya::client::{ApiClient, StatusItem};
use crate::tuya::token::TokenCache;
use crate::tuya::{STATUS_CODE_POWER, STATUS_CODE_VOLTAGE};

/// Independent per-call deadlines. The status call gets the longer
/// budget since it alone decides the verdict.
#[derive(Debug, Clone)]
pub struct ProbeTimeouts {
    pub metadata: Duration,
    pub status: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            metadata: Duration::from_secs(5),
            status: Duration::from_secs(10),
        }
    }
}

/// Probes a single device: metadata + status, merged into one
/// availability verdict and telemetry reading.
pub struct Prober {
    client: Arc<ApiClient>,
    tokens: Arc<TokenCache>,
    timeouts: ProbeTimeouts,
}

impl Prober {
    pub fn new(client: Arc<ApiClient>, tokens: Arc<TokenCache>, timeouts: ProbeTimeouts) -> Self {
        Self {
            client,
            tokens,
            timeouts,
        }
    }

    /// Probe one device and report the outcome as an observation.
    pub async fn probe(&self, device: &Device) -> Observation {
        let mut token = match self.tokens.get_token(false).await {
            Ok(token) => token,
            Err(e) => return Observation::offline(device, e.to_string()),
        };

        // Best-effort metadata: a failure here only means the online
        // flag falls back to the status call succeeding.
        let metadata_online = match self
            .client
            .device_info(&device.id, &token, self.timeouts.metadata)
            .await
        {
            Ok(info) => info.online,
            Err(e) => {
                debug!("Metadata fetch failed for {}: {}", device.id, e);
                None
            }
        };

        // Status call with a single forced-refresh retry on auth
        // rejection. The loop is bounded: a second rejection is
        // terminal.
        let mut retried = false;
        loop {
            let started = Instant::now();
            match self
                .client
                .device_status(&device.id, &token, self.timeouts.status)
                .await
            {
                Ok(items) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    // Metadata saying offline wins over a successful
                    // status call; absence of metadata defaults to
                    // online.
                    return match metadata_online {
                        Some(false) => {
                            Observation::offline(device, "reported offline by provider")
                        }
                        _ => Observation::online(
                            device,
                            elapsed_ms,
                            extract_scaled(&items, STATUS_CODE_POWER),
                            extract_scaled(&items, STATUS_CODE_VOLTAGE),
                        ),
                    };
                }
                Err(e) if e.is_auth_rejection() && !retried => {
                    retried = true;
                    info!(
                        "Token rejected while probing {}, retrying with a fresh one",
                        device.id
                    );
                    self.tokens.invalidate().await;
                    token = match self.tokens.get_token(true).await {
                        Ok(token) => token,
                        Err(e) => return Observation::offline(device, e.to_string()),
                    };
                }
                Err(e) => return Observation::offline(device, e.to_string()),
            }
        }
    }
}

/// Pull a telemetry value by code; raw values arrive in tenths of the
/// reported unit.
fn extract_scaled(items: &[StatusItem], code: &str) -> Option<f64> {
    items
        .iter()
        .find(|item| item.code == code)
        .and_then(|item| item.value.as_f64())
        .map(|raw| raw / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(code: &str, value: serde_json::Value) -> StatusItem {
        serde_json::from_value(json!({ "code": code, "value": value })).unwrap()
    }

    #[test]
    fn test_extract_scaled_divides_by_ten() {
        let items = vec![
            item("switch_1", json!(true)),
            item("cur_power", json!(235)),
            item("cur_voltage", json!(2298)),
        ];
        assert_eq!(extract_scaled(&items, STATUS_CODE_POWER), Some(23.5));
        assert_eq!(extract_scaled(&items, STATUS_CODE_VOLTAGE), Some(229.8));
    }

    #[test]
    fn test_extract_scaled_missing_or_non_numeric() {
        let items = vec![item("cur_power", json!("oops"))];
        assert_eq!(extract_scaled(&items, STATUS_CODE_POWER), None);
        assert_eq!(extract_scaled(&items, STATUS_CODE_VOLTAGE), None);
    }
}
