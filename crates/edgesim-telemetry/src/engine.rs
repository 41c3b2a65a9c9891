//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Stateful telemetry engine producing per-machine readings."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use std::collections::HashMap;

use edgesim_common::config::EngineConfig;
use edgesim_common::time::{monotonic_ms, timestamp_ms};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::anomaly::{anomaly_decision, SeveritySampler};
use crate::catalog::{MachineBaseline, MachineCatalog};
use crate::errors::{Result, SimError};
use crate::reading::{Reading, ReadingStatus};

/// Produces one plausible sensor reading per call for a fixed fleet of
/// machines, honouring the configured anomaly rate.
///
/// Baselines are assigned once at construction and never change. Mutable
/// state is limited to the owned RNG, the round-robin cursor, and a
/// per-machine timestamp watermark; no reading history is retained.
#[derive(Debug)]
pub struct TelemetryEngine {
    config: EngineConfig,
    catalog: MachineCatalog,
    rng: StdRng,
    noise_temperature: Normal<f64>,
    noise_vibration: Normal<f64>,
    noise_rpm: Normal<f64>,
    severity: SeveritySampler,
    watermarks: HashMap<String, i64>,
    cursor: usize,
}

impl TelemetryEngine {
    /// Validate the configuration, seed the RNG, and assign machine
    /// baselines. Identical configuration and seed reproduce the same
    /// baselines and reading value sequence.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|err| SimError::InvalidConfiguration(err.to_string()))?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let catalog = MachineCatalog::assign(&config, &mut rng);
        let noise_temperature = noise_normal(config.noise.temperature_sigma, "temperature")?;
        let noise_vibration = noise_normal(config.noise.vibration_sigma, "vibration")?;
        let noise_rpm = noise_normal(config.noise.rpm_sigma, "rpm")?;
        let severity = SeveritySampler::new(&config.anomaly)?;

        debug!(
            machines = catalog.len(),
            anomaly_rate = config.anomaly_rate,
            seeded = config.seed.is_some(),
            "telemetry engine initialised"
        );

        Ok(Self {
            config,
            catalog,
            rng,
            noise_temperature,
            noise_vibration,
            noise_rpm,
            severity,
            watermarks: HashMap::new(),
            cursor: 0,
        })
    }

    /// Produce one reading for the requested machine.
    pub fn generate_reading(&mut self, machine_id: &str) -> Result<Reading> {
        let baseline = self
            .catalog
            .get(machine_id)
            .ok_or_else(|| SimError::UnknownMachine(machine_id.to_owned()))?
            .clone();
        Ok(self.emit(baseline))
    }

    /// Produce one reading for the next machine in stable catalog order,
    /// wrapping around at the end of the fleet.
    pub fn next_reading(&mut self) -> Reading {
        let index = self.cursor % self.catalog.len();
        self.cursor = self.cursor.wrapping_add(1);
        let baseline = self
            .catalog
            .at(index)
            .expect("catalog is never empty")
            .clone();
        self.emit(baseline)
    }

    /// Produce `size` readings from uniformly random catalog machines.
    pub fn sample_batch(&mut self, size: usize) -> Vec<Reading> {
        (0..size)
            .map(|_| {
                let index = self.rng.gen_range(0..self.catalog.len());
                let baseline = self
                    .catalog
                    .at(index)
                    .expect("catalog is never empty")
                    .clone();
                self.emit(baseline)
            })
            .collect()
    }

    /// Read-only catalog of machine identifiers and baselines, in stable
    /// insertion order. Values never change for the engine lifetime.
    pub fn list_machines(&self) -> Vec<MachineBaseline> {
        self.catalog.machines().cloned().collect()
    }

    pub fn catalog(&self) -> &MachineCatalog {
        &self.catalog
    }

    fn emit(&mut self, baseline: MachineBaseline) -> Reading {
        let anomalous = anomaly_decision(self.config.anomaly_rate, self.rng.gen::<f64>());

        let mut temperature = baseline.temperature + self.noise_temperature.sample(&mut self.rng);
        let mut vibration = baseline.vibration + self.noise_vibration.sample(&mut self.rng);
        let mut rpm = baseline.rpm + self.noise_rpm.sample(&mut self.rng);

        if anomalous {
            let severity = self.severity.sample(&mut self.rng);
            temperature += severity.temperature_offset;
            vibration *= severity.vibration_gain;
            rpm += severity.rpm_offset;
        }

        let limits = &self.config.limits;
        let now = timestamp_ms();
        let timestamp = monotonic_ms(self.watermarks.get(&baseline.machine_id).copied(), now);
        self.watermarks.insert(baseline.machine_id.clone(), timestamp);

        Reading {
            machine_id: baseline.machine_id,
            timestamp_ms: timestamp,
            temperature: limits.temperature.clamp(temperature),
            vibration: limits.vibration.clamp(vibration),
            rpm: limits.rpm.clamp(rpm),
            status: if anomalous {
                ReadingStatus::Warning
            } else {
                ReadingStatus::Normal
            },
            anomaly: anomalous,
        }
    }
}

fn noise_normal(sigma: f64, metric: &str) -> Result<Normal<f64>> {
    Normal::new(0.0, sigma)
        .map_err(|err| SimError::InvalidConfiguration(format!("{metric} noise: {err}")))
}
