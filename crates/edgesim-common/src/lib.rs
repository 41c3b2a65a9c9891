//! ---
//! sim_section: "01-core-functionality"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Shared primitives and utilities for the edgesim workspace."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
//! Core shared primitives for the edgesim workspace. This crate exposes
//! configuration loading, logging, and timestamp utilities consumed by the
//! telemetry engine and the export CLI.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    AnomalyProfile, AppConfig, BaselineRange, BaselineRanges, ClampWindow, EngineConfig,
    ExportConfig, LoggingConfig, MetricLimits, NoiseBands,
};
pub use logging::{init_tracing, LogFormat};
pub use time::{monotonic_ms, timestamp_ms};
