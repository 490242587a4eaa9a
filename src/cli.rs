//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: configuration
//! layering, rayon setup, and the `generate` subcommand.

use anyhow::Result;
use jornal::config::{self, AppConfig, Overrides};
use jornal::formatter::{format_jobs, Clock, SystemClock};
use jornal::simulator::{generate_with, ArrivalModel, SeededSource};
use jornal::export;
use std::io::Write;
use tracing::{info, warn};

use super::{Cli, OutputFormat};

/// Defaults, then the TOML file, then environment and flag overrides.
pub fn load_config(
    cli: &Cli,
    port: Option<u16>,
    num_jobs: Option<i64>,
    arrival_rate_minutes: Option<f64>,
    seed: Option<u64>,
) -> Result<AppConfig> {
    let mut config = config::load(cli.config.as_deref())?;
    config.apply_overrides(Overrides {
        port,
        database_url: cli.database_url.clone(),
        num_jobs,
        arrival_rate_minutes,
        seed,
    });
    Ok(config)
}

pub fn run_generate(config: &AppConfig, format: OutputFormat, postings: bool) -> Result<()> {
    let params = config.generator.params(None, None);
    let mut rng = SeededSource::new(config.generator.seed);
    let samples = generate_with(&params, &mut rng)?;
    info!(
        count = samples.len(),
        seed = config.generator.seed,
        arrival_rate_minutes = params.arrival_rate_minutes,
        "generated jobs"
    );

    let body = if postings {
        let postings = format_jobs(&samples, ArrivalModel::Poisson, SystemClock.now())?;
        match format {
            OutputFormat::Json => export::to_json(&postings)?,
            OutputFormat::Csv => export::postings_csv(&postings),
        }
    } else {
        match format {
            OutputFormat::Json => export::to_json(&samples)?,
            OutputFormat::Csv => export::samples_csv(&samples),
        }
    };

    let mut out = std::io::stdout().lock();
    out.write_all(body.as_bytes())?;
    if !body.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Size the global rayon pool. `None` or 0 uses every logical core.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads == 0 {
        return;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => info!(threads = num_threads, "rayon thread pool configured"),
        Err(e) => warn!(error = %e, "could not configure rayon thread pool"),
    }
}
