//! Durable observation store
//!
//! Append-only: observations are inserted once and never updated or
//! deleted here. Retention is somebody else's job.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::errors::MonitorError;
use crate::monitor::observation::Observation;

/// Sink for completed observations; trait so tests can stand in a
/// failing or recording implementation.
#[async_trait]
pub trait ObservationSink: Send + Sync {
    async fn save(&self, observation: &Observation) -> Result<(), MonitorError>;
}

/// Sqlite-backed sink. Writes hop through `spawn_blocking` so the
/// probe tasks never park the runtime on file IO.
pub struct SqliteSink {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| MonitorError::StorageError(e.to_string()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS observations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                recorded_at TEXT NOT NULL,
                device_id TEXT NOT NULL,
                device_name TEXT NOT NULL,
                is_online INTEGER NOT NULL,
                response_time_ms INTEGER,
                power_w REAL,
                voltage_v REAL,
                error TEXT
            )",
            [],
        )
        .map_err(|e| MonitorError::StorageError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Total stored observations
    pub fn count(&self) -> Result<i64, MonitorError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| MonitorError::StorageError("connection lock poisoned".to_string()))?;
        conn.query_row("SELECT COUNT(*) FROM observations", [], |r| r.get(0))
            .map_err(|e| MonitorError::StorageError(e.to_string()))
    }
}

#[async_trait]
impl ObservationSink for SqliteSink {
    async fn save(&self, observation: &Observation) -> Result<(), MonitorError> {
        let conn = Arc::clone(&self.conn);
        let obs = observation.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| MonitorError::StorageError("connection lock poisoned".to_string()))?;
            conn.execute(
                "INSERT INTO observations
                    (recorded_at, device_id, device_name, is_online,
                     response_time_ms, power_w, voltage_v, error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    obs.recorded_at.to_rfc3339(),
                    obs.device_id,
                    obs.device_name,
                    obs.is_online(),
                    obs.response_time_ms.map(|ms| ms as i64),
                    obs.power_w,
                    obs.voltage_v,
                    obs.error_message(),
                ],
            )
            .map_err(|e| MonitorError::StorageError(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| MonitorError::StorageError(e.to_string()))?
    }
}
