//! ---
//! sim_section: "02-telemetry-engine"
//! sim_subsection: "integration-tests"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Statistical and invariant tests for the telemetry engine."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use edgesim_common::config::{BaselineRange, EngineConfig};
use edgesim_telemetry::{ReadingStatus, TelemetryEngine};

fn engine(seed: u64, anomaly_rate: f64) -> TelemetryEngine {
    TelemetryEngine::new(EngineConfig {
        seed: Some(seed),
        anomaly_rate,
        ..EngineConfig::default()
    })
    .expect("valid config")
}

#[test]
fn zero_rate_never_warns_over_ten_thousand_readings() {
    let mut engine = engine(7, 0.0);
    for _ in 0..10_000 {
        let reading = engine.generate_reading("MACHINE_001").unwrap();
        assert_eq!(reading.status, ReadingStatus::Normal);
        assert!(!reading.anomaly);
    }
}

#[test]
fn full_rate_always_warns_and_perturbs_beyond_noise_band() {
    let mut warn = engine(7, 1.0);
    let mut calm = engine(7, 0.0);
    let baseline_temp = warn.list_machines()[0].temperature;

    let n = 2_000;
    let mut warn_dev = 0.0;
    let mut calm_dev = 0.0;
    for _ in 0..n {
        let anomalous = warn.generate_reading("MACHINE_001").unwrap();
        assert_eq!(anomalous.status, ReadingStatus::Warning);
        assert!(anomalous.anomaly);
        warn_dev += (anomalous.temperature - baseline_temp).abs();
        let normal = calm.generate_reading("MACHINE_001").unwrap();
        calm_dev += (normal.temperature - baseline_temp).abs();
    }
    // Mean anomalous temperature deviation is centred on +15 while normal
    // noise is N(0, 2); the gap is far wider than the noise band.
    assert!(warn_dev / n as f64 > 3.0 * calm_dev / n as f64);
}

#[test]
fn metrics_stay_within_clamp_windows_under_stress() {
    // Baselines near the RPM floor with the default sigma of 50 would drift
    // negative without clamping.
    let config = EngineConfig {
        seed: Some(3),
        anomaly_rate: 0.5,
        baselines: edgesim_common::config::BaselineRanges {
            rpm: BaselineRange {
                min: 10.0,
                max: 20.0,
            },
            ..Default::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = TelemetryEngine::new(config).expect("valid config");
    for _ in 0..5_000 {
        let reading = engine.next_reading();
        assert!(reading.rpm >= 0.0 && reading.rpm <= 10_000.0);
        assert!(reading.temperature >= 0.0 && reading.temperature <= 200.0);
        assert!(reading.vibration >= 0.0 && reading.vibration <= 50.0);
    }
}

#[test]
fn reference_scenario_warning_rate_within_tolerance() {
    // 5 machines, anomaly_rate 0.05, seed 42: 1000 readings for MACHINE_003
    // must land in the 3%-8% warning band with no negative RPM.
    let mut engine = engine(42, 0.05);
    let mut warnings = 0usize;
    for _ in 0..1_000 {
        let reading = engine.generate_reading("MACHINE_003").unwrap();
        assert!(reading.rpm >= 0.0);
        if reading.status.is_warning() {
            warnings += 1;
        }
    }
    assert!(
        (30..=80).contains(&warnings),
        "warning count {warnings} outside the 3%-8% band"
    );
}

#[test]
fn list_machines_matches_generate_reading_domain() {
    let mut engine = engine(13, 0.05);
    let machines = engine.list_machines();
    assert_eq!(machines.len(), 5);
    for machine in &machines {
        engine
            .generate_reading(&machine.machine_id)
            .expect("listed machine generates");
    }
    assert!(engine.generate_reading("MACHINE_006").is_err());
}
