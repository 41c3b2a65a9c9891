//! ---
//! sim_section: "01-core-functionality"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Shared primitives and utilities for the edgesim workspace."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_num_machines() -> usize {
    5
}

fn default_anomaly_rate() -> f64 {
    0.05
}

fn default_machine_prefix() -> String {
    "MACHINE".to_owned()
}

fn default_temperature_range() -> BaselineRange {
    BaselineRange {
        min: 60.0,
        max: 90.0,
    }
}

fn default_vibration_range() -> BaselineRange {
    BaselineRange { min: 0.1, max: 2.0 }
}

fn default_rpm_range() -> BaselineRange {
    BaselineRange {
        min: 1000.0,
        max: 3000.0,
    }
}

fn default_temperature_sigma() -> f64 {
    2.0
}

fn default_vibration_sigma() -> f64 {
    0.1
}

fn default_rpm_sigma() -> f64 {
    50.0
}

fn default_temperature_offset_mean() -> f64 {
    15.0
}

fn default_temperature_offset_sigma() -> f64 {
    5.0
}

fn default_vibration_gain() -> f64 {
    1.5
}

fn default_rpm_offset_mean() -> f64 {
    100.0
}

fn default_rpm_offset_sigma() -> f64 {
    30.0
}

fn default_temperature_window() -> ClampWindow {
    ClampWindow {
        floor: 0.0,
        ceiling: 200.0,
    }
}

fn default_vibration_window() -> ClampWindow {
    ClampWindow {
        floor: 0.0,
        ceiling: 50.0,
    }
}

fn default_rpm_window() -> ClampWindow {
    ClampWindow {
        floor: 0.0,
        ceiling: 10_000.0,
    }
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_export_duration() -> Duration {
    Duration::from_secs(60)
}

fn default_export_interval() -> Duration {
    Duration::from_secs(1)
}

/// Primary configuration object for the edgesim runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "EDGESIM_CONFIG";

    /// Load configuration from disk, respecting the `EDGESIM_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration surface of the telemetry engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_num_machines")]
    pub num_machines: usize,
    #[serde(default = "default_anomaly_rate")]
    pub anomaly_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_machine_prefix")]
    pub machine_prefix: String,
    #[serde(default)]
    pub baselines: BaselineRanges,
    #[serde(default)]
    pub noise: NoiseBands,
    #[serde(default)]
    pub anomaly: AnomalyProfile,
    #[serde(default)]
    pub limits: MetricLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_machines: default_num_machines(),
            anomaly_rate: default_anomaly_rate(),
            seed: None,
            machine_prefix: default_machine_prefix(),
            baselines: BaselineRanges::default(),
            noise: NoiseBands::default(),
            anomaly: AnomalyProfile::default(),
            limits: MetricLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Validate structural invariants of the engine configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_machines == 0 {
            return Err(anyhow!("num_machines must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.anomaly_rate) {
            return Err(anyhow!(
                "anomaly_rate {} must lie within [0.0, 1.0]",
                self.anomaly_rate
            ));
        }
        if self.machine_prefix.trim().is_empty() {
            return Err(anyhow!("machine_prefix must not be empty"));
        }
        self.baselines.validate()?;
        self.noise.validate()?;
        self.anomaly.validate()?;
        self.limits.validate()?;
        self.limits.contains_ranges(&self.baselines)?;
        Ok(())
    }
}

/// Half-open sampling range a baseline is drawn from at engine construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaselineRange {
    pub min: f64,
    pub max: f64,
}

impl BaselineRange {
    fn validate(&self, metric: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(anyhow!("{} baseline range must be finite", metric));
        }
        if self.min >= self.max {
            return Err(anyhow!(
                "{} baseline range min {} must be below max {}",
                metric,
                self.min,
                self.max
            ));
        }
        Ok(())
    }
}

/// Per-metric baseline sampling ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineRanges {
    #[serde(default = "default_temperature_range")]
    pub temperature: BaselineRange,
    #[serde(default = "default_vibration_range")]
    pub vibration: BaselineRange,
    #[serde(default = "default_rpm_range")]
    pub rpm: BaselineRange,
}

impl Default for BaselineRanges {
    fn default() -> Self {
        Self {
            temperature: default_temperature_range(),
            vibration: default_vibration_range(),
            rpm: default_rpm_range(),
        }
    }
}

impl BaselineRanges {
    fn validate(&self) -> Result<()> {
        self.temperature.validate("temperature")?;
        self.vibration.validate("vibration")?;
        self.rpm.validate("rpm")?;
        Ok(())
    }
}

/// Standard deviations of the normal-operation noise applied around baselines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseBands {
    #[serde(default = "default_temperature_sigma")]
    pub temperature_sigma: f64,
    #[serde(default = "default_vibration_sigma")]
    pub vibration_sigma: f64,
    #[serde(default = "default_rpm_sigma")]
    pub rpm_sigma: f64,
}

impl Default for NoiseBands {
    fn default() -> Self {
        Self {
            temperature_sigma: default_temperature_sigma(),
            vibration_sigma: default_vibration_sigma(),
            rpm_sigma: default_rpm_sigma(),
        }
    }
}

impl NoiseBands {
    fn validate(&self) -> Result<()> {
        for (metric, sigma) in [
            ("temperature", self.temperature_sigma),
            ("vibration", self.vibration_sigma),
            ("rpm", self.rpm_sigma),
        ] {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(anyhow!("{} noise sigma {} must be positive", metric, sigma));
            }
        }
        Ok(())
    }
}

/// Perturbation applied on top of the normal noise when a reading is anomalous.
///
/// Temperature and RPM receive an additive normally-distributed offset;
/// vibration is scaled by a multiplicative gain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyProfile {
    #[serde(default = "default_temperature_offset_mean")]
    pub temperature_offset_mean: f64,
    #[serde(default = "default_temperature_offset_sigma")]
    pub temperature_offset_sigma: f64,
    #[serde(default = "default_vibration_gain")]
    pub vibration_gain: f64,
    #[serde(default = "default_rpm_offset_mean")]
    pub rpm_offset_mean: f64,
    #[serde(default = "default_rpm_offset_sigma")]
    pub rpm_offset_sigma: f64,
}

impl Default for AnomalyProfile {
    fn default() -> Self {
        Self {
            temperature_offset_mean: default_temperature_offset_mean(),
            temperature_offset_sigma: default_temperature_offset_sigma(),
            vibration_gain: default_vibration_gain(),
            rpm_offset_mean: default_rpm_offset_mean(),
            rpm_offset_sigma: default_rpm_offset_sigma(),
        }
    }
}

impl AnomalyProfile {
    fn validate(&self) -> Result<()> {
        if !(self.temperature_offset_sigma.is_finite() && self.temperature_offset_sigma > 0.0) {
            return Err(anyhow!("anomaly temperature offset sigma must be positive"));
        }
        if !(self.rpm_offset_sigma.is_finite() && self.rpm_offset_sigma > 0.0) {
            return Err(anyhow!("anomaly rpm offset sigma must be positive"));
        }
        if !(self.vibration_gain.is_finite() && self.vibration_gain > 0.0) {
            return Err(anyhow!("anomaly vibration gain must be positive"));
        }
        Ok(())
    }
}

/// Domain-valid window a metric is clamped to after perturbation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClampWindow {
    pub floor: f64,
    pub ceiling: f64,
}

impl ClampWindow {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.floor, self.ceiling)
    }

    fn validate(&self, metric: &str) -> Result<()> {
        if !self.floor.is_finite() || !self.ceiling.is_finite() {
            return Err(anyhow!("{} clamp window must be finite", metric));
        }
        if self.floor >= self.ceiling {
            return Err(anyhow!(
                "{} clamp window floor {} must be below ceiling {}",
                metric,
                self.floor,
                self.ceiling
            ));
        }
        Ok(())
    }

    fn contains(&self, metric: &str, range: &BaselineRange) -> Result<()> {
        if range.min < self.floor || range.max > self.ceiling {
            return Err(anyhow!(
                "{} baseline range [{}, {}] exceeds clamp window [{}, {}]",
                metric,
                range.min,
                range.max,
                self.floor,
                self.ceiling
            ));
        }
        Ok(())
    }
}

/// Per-metric clamp windows keeping perturbed values physically plausible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricLimits {
    #[serde(default = "default_temperature_window")]
    pub temperature: ClampWindow,
    #[serde(default = "default_vibration_window")]
    pub vibration: ClampWindow,
    #[serde(default = "default_rpm_window")]
    pub rpm: ClampWindow,
}

impl Default for MetricLimits {
    fn default() -> Self {
        Self {
            temperature: default_temperature_window(),
            vibration: default_vibration_window(),
            rpm: default_rpm_window(),
        }
    }
}

impl MetricLimits {
    fn validate(&self) -> Result<()> {
        self.temperature.validate("temperature")?;
        self.vibration.validate("vibration")?;
        self.rpm.validate("rpm")?;
        Ok(())
    }

    fn contains_ranges(&self, ranges: &BaselineRanges) -> Result<()> {
        self.temperature.contains("temperature", &ranges.temperature)?;
        self.vibration.contains("vibration", &ranges.vibration)?;
        self.rpm.contains("rpm", &ranges.rpm)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Defaults for the export CLI when no flags are supplied.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_duration")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub duration: Duration,
    #[serde(default = "default_export_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub interval: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            duration: default_export_duration(),
            interval: default_export_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("defaults must validate");
        assert_eq!(config.engine.num_machines, 5);
        assert!((config.engine.anomaly_rate - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_minimal_toml() {
        let config: AppConfig = "[engine]\nnum_machines = 3\nanomaly_rate = 0.1\nseed = 42\n"
            .parse()
            .expect("minimal config parses");
        assert_eq!(config.engine.num_machines, 3);
        assert_eq!(config.engine.seed, Some(42));
    }

    #[test]
    fn rejects_out_of_range_anomaly_rate() {
        let err = "[engine]\nanomaly_rate = 1.5\n"
            .parse::<AppConfig>()
            .expect_err("rate above 1.0 must fail");
        assert!(err.to_string().contains("anomaly_rate"));
    }

    #[test]
    fn rejects_zero_machines() {
        let err = "[engine]\nnum_machines = 0\n"
            .parse::<AppConfig>()
            .expect_err("zero machines must fail");
        assert!(err.to_string().contains("num_machines"));
    }

    #[test]
    fn rejects_inverted_baseline_range() {
        let toml = "[engine.baselines.temperature]\nmin = 90.0\nmax = 60.0\n";
        let err = toml
            .parse::<AppConfig>()
            .expect_err("inverted range must fail");
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn rejects_range_outside_clamp_window() {
        let toml = "[engine.baselines.rpm]\nmin = 1000.0\nmax = 20000.0\n";
        let err = toml
            .parse::<AppConfig>()
            .expect_err("range above ceiling must fail");
        assert!(err.to_string().contains("clamp window"));
    }

    #[test]
    fn load_prefers_first_existing_candidate() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[engine]\nnum_machines = 2\n").expect("write config");
        let loaded = AppConfig::load_with_source(&[
            PathBuf::from("does/not/exist.toml"),
            file.path().to_path_buf(),
        ])
        .expect("second candidate loads");
        assert_eq!(loaded.config.engine.num_machines, 2);
        assert_eq!(loaded.source, file.path());
    }
}
