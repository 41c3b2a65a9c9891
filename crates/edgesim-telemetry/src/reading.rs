//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Immutable telemetry reading record and status."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Operating status attached to a reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Normal,
    Warning,
}

impl ReadingStatus {
    pub fn is_warning(&self) -> bool {
        matches!(self, ReadingStatus::Warning)
    }
}

/// One emitted telemetry sample. Immutable once constructed; ownership moves
/// to the caller and the engine keeps no reference to it.
///
/// Serialises to the flat record landed by downstream ingestion:
/// `{machine_id, timestamp_ms, temperature, vibration, rpm, status, anomaly}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub machine_id: String,
    pub timestamp_ms: i64,
    pub temperature: f64,
    pub vibration: f64,
    pub rpm: f64,
    pub status: ReadingStatus,
    pub anomaly: bool,
}

impl Reading {
    pub fn is_anomalous(&self) -> bool {
        self.status.is_warning()
    }
}
