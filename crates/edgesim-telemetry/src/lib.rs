//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Telemetry engine module exports and shared types."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
//! Synthetic machine telemetry for the edgesim project.
//!
//! The engine owns a fixed catalog of machine baselines and produces one
//! immutable [`Reading`] per call, flagging a configurable fraction of
//! readings as anomalous. It performs no I/O and retains no reading history;
//! concurrent workers each construct their own engine with an independent
//! seed instead of sharing one instance.

pub mod anomaly;
pub mod catalog;
pub mod engine;
pub mod errors;
pub mod reading;

pub use anomaly::{anomaly_decision, AnomalySeverity, SeveritySampler};
pub use catalog::{MachineBaseline, MachineCatalog};
pub use engine::TelemetryEngine;
pub use errors::{Result, SimError};
pub use reading::{Reading, ReadingStatus};
