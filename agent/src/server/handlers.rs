//! HTTP request handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use crate::errors::MonitorError;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "plugwatch".to_string(),
        version: version.version,
    })
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Configured devices response
#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
}

/// Configured devices handler
pub async fn devices_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let devices: Vec<DeviceInfo> = state
        .monitor
        .devices()
        .iter()
        .map(|d| DeviceInfo {
            id: d.id.clone(),
            name: d.name.clone(),
        })
        .collect();

    let total = devices.len();
    Json(DevicesResponse { devices, total })
}

/// Poll trigger handler: run one cycle now and return the summary.
pub async fn poll_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.monitor.run_cycle().await {
        Ok(summary) => Ok(Json(summary)),
        Err(MonitorError::NoDevices) => Err((
            StatusCode::CONFLICT,
            MonitorError::NoDevices.to_string(),
        )),
        Err(e) => {
            error!("Poll cycle failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
