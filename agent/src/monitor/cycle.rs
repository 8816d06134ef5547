//! Poll-cycle orchestration
//!
//! One cycle fans out a probe per configured device, waits for all of
//! them, appends each observation to the sink and returns a summary.
//! Individual probe failures are already folded into observations; the
//! only cycle-level error is an empty device set.

use std::sync::Arc;

use futures::future;
use serde::Serialize;
use tracing::{error, info};

use crate::config::settings::Device;
use crate::errors::MonitorError;
use crate::monitor::observation::Observation;
use crate::monitor::prober::Prober;
use crate::storage::observations::ObservationSink;

/// Per-device verdict in a cycle summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResult {
    pub device_id: String,
    pub device_name: String,
    pub is_online: bool,
    pub response_time_ms: Option<u64>,
    pub power_consumption_w: Option<f64>,
}

impl From<&Observation> for DeviceResult {
    fn from(obs: &Observation) -> Self {
        Self {
            device_id: obs.device_id.clone(),
            device_name: obs.device_name.clone(),
            is_online: obs.is_online(),
            response_time_ms: obs.response_time_ms,
            power_consumption_w: obs.power_w,
        }
    }
}

/// Result of one full poll cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    pub devices_checked: usize,
    pub online: usize,
    pub offline: usize,
    pub results: Vec<DeviceResult>,
}

/// Runs poll cycles over the configured device set.
pub struct Monitor {
    devices: Vec<Device>,
    prober: Prober,
    sink: Arc<dyn ObservationSink>,
}

impl Monitor {
    pub fn new(devices: Vec<Device>, prober: Prober, sink: Arc<dyn ObservationSink>) -> Self {
        Self {
            devices,
            prober,
            sink,
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Run one poll cycle now.
    pub async fn run_cycle(&self) -> Result<CycleSummary, MonitorError> {
        if self.devices.is_empty() {
            return Err(MonitorError::NoDevices);
        }

        info!("Starting poll cycle over {} device(s)", self.devices.len());

        let probes = self.devices.iter().map(|device| self.prober.probe(device));
        let observations = future::join_all(probes).await;

        // Verdicts are fixed before persistence, so a failed write can
        // never change what the cycle reports.
        let results: Vec<DeviceResult> = observations.iter().map(DeviceResult::from).collect();
        let online = results.iter().filter(|r| r.is_online).count();

        for obs in &observations {
            if let Err(e) = self.sink.save(obs).await {
                error!("Failed to persist observation for {}: {}", obs.device_id, e);
            }
        }

        let summary = CycleSummary {
            devices_checked: observations.len(),
            online,
            offline: observations.len() - online,
            results,
        };

        info!(
            "Poll cycle finished: {} online, {} offline",
            summary.online, summary.offline
        );

        Ok(summary)
    }
}
