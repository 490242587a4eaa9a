//! # Main — CLI Entry Point
//!
//! Routes subcommands to the HTTP service and the offline generator.
//!
//! ## Subcommands
//!
//! - `serve`: run the job board API (PostgreSQL when a database URL is set,
//!   in-memory otherwise).
//! - `generate`: print a synthetic batch as JSON or CSV.
//!
//! ## Global Options
//!
//! - `--config` / `JORNAL_CONFIG`: TOML settings file.
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection.
//! - `--threads`: Rayon thread pool size (0 = all cores).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "jornal",
    version,
    about = "Synthetic harvest job generator and labor marketplace API"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "JORNAL_CONFIG")]
    config: Option<PathBuf>,

    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the job board HTTP API
    Serve {
        /// Port to listen on
        #[arg(long, env = "JORNAL_PORT")]
        port: Option<u16>,
        /// Directory of static frontend assets served as fallback
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Generate a synthetic batch of harvest jobs and print it
    Generate {
        /// Number of jobs
        #[arg(long, allow_negative_numbers = true)]
        num_jobs: Option<i64>,
        /// Mean minutes between Poisson arrivals
        #[arg(long)]
        arrival_rate: Option<f64>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Print dated job postings instead of raw samples
        #[arg(long)]
        postings: bool,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for K8s, human-readable otherwise.
    // Both go to stderr; stdout carries `generate` output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads);

    match &cli.command {
        Commands::Serve { port, static_dir } => {
            let config = cli::load_config(&cli, *port, None, None, None)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(jornal::dashboard::run(config, static_dir.as_deref()))
        }
        Commands::Generate {
            num_jobs,
            arrival_rate,
            seed,
            format,
            postings,
        } => {
            let config = cli::load_config(&cli, None, *num_jobs, *arrival_rate, *seed)?;
            cli::run_generate(&config, *format, *postings)
        }
    }
}
