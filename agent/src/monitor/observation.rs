//! Observation model
//!
//! One record per device per poll cycle, immutable once created.
//! Offline observations never carry telemetry values, whatever the
//! provider response contained; the constructors enforce this.

use chrono::{DateTime, Utc};

use crate::config::settings::Device;

/// Probe verdict with the offline reason attached
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Online,
    Offline(String),
}

impl ProbeOutcome {
    pub fn is_online(&self) -> bool {
        matches!(self, ProbeOutcome::Online)
    }
}

/// One reachability/telemetry record for a device
#[derive(Debug, Clone)]
pub struct Observation {
    pub recorded_at: DateTime<Utc>,
    pub device_id: String,
    pub device_name: String,
    pub outcome: ProbeOutcome,

    /// Status-call latency; only present for a definitive response
    pub response_time_ms: Option<u64>,

    /// Instantaneous power draw in watts
    pub power_w: Option<f64>,

    /// Line voltage in volts
    pub voltage_v: Option<f64>,
}

impl Observation {
    pub fn online(
        device: &Device,
        response_time_ms: u64,
        power_w: Option<f64>,
        voltage_v: Option<f64>,
    ) -> Self {
        Self {
            recorded_at: Utc::now(),
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            outcome: ProbeOutcome::Online,
            response_time_ms: Some(response_time_ms),
            power_w,
            voltage_v,
        }
    }

    pub fn offline(device: &Device, reason: impl Into<String>) -> Self {
        Self {
            recorded_at: Utc::now(),
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            outcome: ProbeOutcome::Offline(reason.into()),
            response_time_ms: None,
            power_w: None,
            voltage_v: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.outcome.is_online()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Online => None,
            ProbeOutcome::Offline(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> Device {
        Device {
            id: "dev1".to_string(),
            name: "House".to_string(),
        }
    }

    #[test]
    fn test_offline_observation_has_no_telemetry() {
        let obs = Observation::offline(&test_device(), "Timeout");
        assert!(!obs.is_online());
        assert_eq!(obs.error_message(), Some("Timeout"));
        assert!(obs.power_w.is_none());
        assert!(obs.voltage_v.is_none());
        assert!(obs.response_time_ms.is_none());
    }

    #[test]
    fn test_online_observation_carries_telemetry() {
        let obs = Observation::online(&test_device(), 120, Some(23.5), Some(229.8));
        assert!(obs.is_online());
        assert_eq!(obs.error_message(), None);
        assert_eq!(obs.power_w, Some(23.5));
        assert_eq!(obs.response_time_ms, Some(120));
    }
}
