//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Telemetry engine error taxonomy."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

/// Failures the telemetry engine can surface. Both are synchronous caller
/// errors with no retry semantics; the engine never emits a partial reading.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("machine '{0}' is not present in the catalog")]
    UnknownMachine(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
