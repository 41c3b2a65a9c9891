//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Memoryless anomaly decision and perturbation sampling."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use edgesim_common::config::AnomalyProfile;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::{Result, SimError};

/// Memoryless anomaly decision: a pure function of the configured rate and a
/// uniform draw in [0, 1). No streak state is carried between calls.
pub fn anomaly_decision(rate: f64, draw: f64) -> bool {
    draw < rate
}

/// Concrete perturbation applied to one anomalous reading.
#[derive(Debug, Clone, Copy)]
pub struct AnomalySeverity {
    pub temperature_offset: f64,
    pub vibration_gain: f64,
    pub rpm_offset: f64,
}

/// Samples anomaly perturbations from the configured profile. Distributions
/// are built once so the hot path only draws.
#[derive(Debug, Clone)]
pub struct SeveritySampler {
    temperature_offset: Normal<f64>,
    vibration_gain: f64,
    rpm_offset: Normal<f64>,
}

impl SeveritySampler {
    pub fn new(profile: &AnomalyProfile) -> Result<Self> {
        let temperature_offset = Normal::new(
            profile.temperature_offset_mean,
            profile.temperature_offset_sigma,
        )
        .map_err(|err| SimError::InvalidConfiguration(format!("anomaly temperature: {err}")))?;
        let rpm_offset = Normal::new(profile.rpm_offset_mean, profile.rpm_offset_sigma)
            .map_err(|err| SimError::InvalidConfiguration(format!("anomaly rpm: {err}")))?;
        Ok(Self {
            temperature_offset,
            vibration_gain: profile.vibration_gain,
            rpm_offset,
        })
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> AnomalySeverity {
        AnomalySeverity {
            temperature_offset: self.temperature_offset.sample(rng),
            vibration_gain: self.vibration_gain,
            rpm_offset: self.rpm_offset.sample(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn decision_is_strictly_below_rate() {
        assert!(anomaly_decision(0.05, 0.049));
        assert!(!anomaly_decision(0.05, 0.05));
        assert!(!anomaly_decision(0.0, 0.0));
        assert!(anomaly_decision(1.0, 0.999_999));
    }

    #[test]
    fn sampler_centres_on_configured_means() {
        let sampler = SeveritySampler::new(&AnomalyProfile::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let n = 10_000;
        let mean_temp: f64 = (0..n)
            .map(|_| sampler.sample(&mut rng).temperature_offset)
            .sum::<f64>()
            / n as f64;
        assert!((mean_temp - 15.0).abs() < 0.5);
    }

    #[test]
    fn sampler_rejects_non_positive_sigma() {
        let profile = AnomalyProfile {
            temperature_offset_sigma: 0.0,
            ..AnomalyProfile::default()
        };
        assert!(matches!(
            SeveritySampler::new(&profile),
            Err(SimError::InvalidConfiguration(_))
        ));
    }
}
