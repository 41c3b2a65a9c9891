//! ---
//! sim_section: "03-scenario-export"
//! sim_subsection: "module"
//! sim_type: "source"
//! sim_scope: "code"
//! sim_description: "Reading export CLI for scenario authoring and ingestion dry-runs."
//! sim_version: "v0.1.0"
//! sim_owner: "tbd"
//! ---
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use edgesim_common::config::AppConfig;
use edgesim_common::logging::init_tracing;
use edgesim_telemetry::TelemetryEngine;
use tracing::info;

const CONFIG_CANDIDATES: &[&str] = &["configs/default.toml", "/etc/edgesim/config.toml"];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Selection {
    RoundRobin,
    Random,
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Export synthetic machine readings for ingestion dry-runs",
    long_about = None
)]
struct Cli {
    /// Explicit configuration file (else EDGESIM_CONFIG / candidate search)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pin generation to a single machine identifier
    #[arg(long)]
    machine: Option<String>,

    /// Override the configured machine count
    #[arg(long)]
    machines: Option<usize>,

    /// Override the configured anomaly rate
    #[arg(long)]
    anomaly_rate: Option<f64>,

    /// Random seed for reproducible exports
    #[arg(long)]
    seed: Option<u64>,

    /// Output file path. Use '-' for stdout.
    #[arg(long, default_value = "readings.csv")]
    output: PathBuf,

    /// Explicit output format when extension is ambiguous
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Total duration in seconds to synthesise (ignored when --samples supplied)
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Interval between samples in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Explicit number of samples to generate (overrides --duration/--interval)
    #[arg(long)]
    samples: Option<u64>,

    /// Machine selection strategy when --machine is not pinned
    #[arg(long, value_enum, default_value_t = Selection::RoundRobin)]
    select: Selection,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    if cli.output.as_os_str() != "-" {
        init_tracing("edgesim-gen", &config.logging)?;
    }

    let total_samples = compute_sample_count(&cli, &config)?;
    let format = determine_format(&cli.output, cli.format);
    let mut engine = build_engine(&cli, &config)?;

    if let Some(machine) = &cli.machine {
        if !engine.catalog().contains(machine) {
            return Err(anyhow!(
                "machine '{}' is not in the catalog ({} machines configured)",
                machine,
                engine.catalog().len()
            ));
        }
    }

    let readings = collect_readings(&cli, total_samples, &mut engine)?;
    match format {
        OutputFormat::Csv => write_csv(&cli.output, &readings)?,
        OutputFormat::Json => write_json(&cli.output, &readings)?,
    }

    if cli.output.as_os_str() != "-" {
        info!(
            samples = total_samples,
            output = %cli.output.display(),
            "export complete"
        );
    }
    eprintln!(
        "generated {} readings -> {}",
        total_samples,
        cli.output.display()
    );

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    if let Some(path) = &cli.config {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        return contents.parse();
    }
    let candidates: Vec<PathBuf> = CONFIG_CANDIDATES.iter().map(PathBuf::from).collect();
    load_from_candidates(&candidates)
}

fn load_from_candidates(candidates: &[PathBuf]) -> Result<AppConfig> {
    let env_override = std::env::var(AppConfig::ENV_CONFIG_PATH)
        .ok()
        .filter(|value| !value.trim().is_empty());
    // No config on disk is fine for a generator CLI; defaults apply. A file
    // that does exist (or an explicit EDGESIM_CONFIG path) must load cleanly,
    // so read/parse/validation failures propagate instead of being masked.
    if env_override.is_none() && !candidates.iter().any(|candidate| candidate.exists()) {
        return Ok(AppConfig::default());
    }
    AppConfig::load(candidates)
}

fn compute_sample_count(cli: &Cli, config: &AppConfig) -> Result<u64> {
    if let Some(samples) = cli.samples {
        return if samples == 0 {
            Err(anyhow!("samples must be greater than zero"))
        } else {
            Ok(samples)
        };
    }
    let duration_ms = cli
        .duration_secs
        .map(|secs| secs.saturating_mul(1000))
        .unwrap_or(config.export.duration.as_millis() as u64);
    let interval_ms = cli
        .interval_ms
        .unwrap_or(config.export.interval.as_millis() as u64);
    if interval_ms == 0 {
        return Err(anyhow!("interval-ms must be greater than zero"));
    }
    Ok((duration_ms / interval_ms).max(1))
}

fn determine_format(path: &Path, override_format: Option<OutputFormat>) -> OutputFormat {
    if let Some(format) = override_format {
        return format;
    }
    if path.as_os_str() == "-" {
        return OutputFormat::Json;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Csv,
    }
}

fn build_engine(cli: &Cli, config: &AppConfig) -> Result<TelemetryEngine> {
    let mut engine_config = config.engine.clone();
    if let Some(machines) = cli.machines {
        engine_config.num_machines = machines;
    }
    if let Some(rate) = cli.anomaly_rate {
        engine_config.anomaly_rate = rate;
    }
    if let Some(seed) = cli.seed {
        engine_config.seed = Some(seed);
    }
    TelemetryEngine::new(engine_config).context("failed to construct telemetry engine")
}

fn collect_readings(
    cli: &Cli,
    samples: u64,
    engine: &mut TelemetryEngine,
) -> Result<Vec<edgesim_telemetry::Reading>> {
    if let Some(machine) = &cli.machine {
        return (0..samples)
            .map(|_| {
                engine
                    .generate_reading(machine)
                    .context("pinned machine disappeared from catalog")
            })
            .collect();
    }
    match cli.select {
        Selection::RoundRobin => Ok((0..samples).map(|_| engine.next_reading()).collect()),
        Selection::Random => Ok(engine.sample_batch(samples as usize)),
    }
}

fn write_csv(output: &Path, readings: &[edgesim_telemetry::Reading]) -> Result<()> {
    let writer: Box<dyn Write> = if output.as_os_str() == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            File::create(output)
                .with_context(|| format!("failed to create output file {}", output.display()))?,
        )
    };
    let mut writer = csv::Writer::from_writer(writer);
    for reading in readings {
        writer.serialize(reading)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(output: &Path, readings: &[edgesim_telemetry::Reading]) -> Result<()> {
    if output.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, readings)?;
        stdout.write_all(b"\n")?;
    } else {
        let file = File::create(output)
            .with_context(|| format!("failed to create output file {}", output.display()))?;
        serde_json::to_writer_pretty(file, readings)?;
    }
    Ok(())
}
