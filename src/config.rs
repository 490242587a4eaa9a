//! TOML configuration structs, parsing, and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment and command-line overrides applied by the caller through
//! [`AppConfig::apply_overrides`]. Every section is optional in the file.
//!
//! ```toml
//! [server]
//! port = 8000
//! cors_origins = ["http://localhost:3000"]
//!
//! [generator]
//! num_jobs = 50
//! arrival_rate_minutes = 30.0
//! seed = 42
//!
//! [database]
//! url = "postgres://localhost/jornal"
//! max_connections = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::simulator::{
    SimulationParams, DEFAULT_ARRIVAL_RATE_MINUTES, DEFAULT_NUM_JOBS, DEFAULT_SEED,
};

// ── TOML Configuration Structs ──────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// The `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// The `[generator]` section: parameters for startup seeding and
/// `POST /jobs/regenerate` defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_num_jobs")]
    pub num_jobs: i64,
    #[serde(default = "default_arrival_rate")]
    pub arrival_rate_minutes: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub constant_interval_minutes: Option<f64>,
}

fn default_num_jobs() -> i64 {
    DEFAULT_NUM_JOBS
}

fn default_arrival_rate() -> f64 {
    DEFAULT_ARRIVAL_RATE_MINUTES
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            num_jobs: default_num_jobs(),
            arrival_rate_minutes: default_arrival_rate(),
            seed: default_seed(),
            constant_interval_minutes: None,
        }
    }
}

impl GeneratorConfig {
    /// Simulation parameters with `num_jobs` and `arrival_rate_minutes`
    /// overriding the configured values when given.
    pub fn params(&self, num_jobs: Option<i64>, arrival_rate_minutes: Option<f64>) -> SimulationParams {
        SimulationParams {
            num_jobs: num_jobs.unwrap_or(self.num_jobs),
            arrival_rate_minutes: arrival_rate_minutes.unwrap_or(self.arrival_rate_minutes),
            constant_interval_minutes: self.constant_interval_minutes,
        }
    }
}

/// The `[database]` section. Without a URL the service runs on the
/// in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Values from the environment or command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub num_jobs: Option<i64>,
    pub arrival_rate_minutes: Option<f64>,
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.database_url {
            self.database.url = Some(url);
        }
        if let Some(n) = overrides.num_jobs {
            self.generator.num_jobs = n;
        }
        if let Some(rate) = overrides.arrival_rate_minutes {
            self.generator.arrival_rate_minutes = rate;
        }
        if let Some(seed) = overrides.seed {
            self.generator.seed = seed;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

// ── TOML Parsing ────────────────────────────────────────────────

/// Parse a configuration from a TOML string.
pub fn parse_toml(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read config file {}", p.display()))?;
            parse_toml(&content).with_context(|| format!("invalid config file {}", p.display()))
        }
        None => Ok(AppConfig::default()),
    }
}

fn validate_config(config: &AppConfig) -> Result<()> {
    if config.server.request_timeout_secs == 0 {
        anyhow::bail!("server.request_timeout_secs must be positive");
    }
    if config.server.body_limit_bytes == 0 {
        anyhow::bail!("server.body_limit_bytes must be positive");
    }
    if config.database.max_connections == 0 {
        anyhow::bail!("database.max_connections must be positive");
    }
    config
        .generator
        .params(None, None)
        .validate()
        .context("invalid [generator] section")?;
    Ok(())
}
