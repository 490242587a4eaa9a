//! # Simulator — Seedable Harvest Job Generator
//!
//! Produces synthetic harvest jobs for demos and tests: crop-conditional job
//! attributes plus two arrival-time sequences (constant interval and Poisson
//! process). Output is a pure function of `(seed, params)`.
//!
//! ## Draw Order
//!
//! One random stream, owned by the generation call, consumed strictly in this
//! order:
//!
//! 1. crop type for every job (one uniform draw each)
//! 2. per job, in job order: quantity, crew size, pay rate, productivity
//!    (the normal draw takes two uniforms)
//! 3. one exponential gap per job for the Poisson arrivals
//!
//! Any backend implementing [`RandomSource`] reproduces a given output only if
//! it honours this order.
//!
//! ## Module Structure
//!
//! - [`crops`] — crop lookup table (ranges, distributions, labels)
//! - [`rng`] — random source trait and the seeded `StdRng` backend
//! - [`sampler`] — attribute draws and derived fields
//! - [`arrivals`] — constant and Poisson arrival schedules

pub mod arrivals;
pub mod crops;
pub mod rng;
pub mod sampler;

pub use arrivals::{ArrivalModel, ArrivalSchedule};
pub use crops::{CropProfile, CropType, UnitType, CROP_TABLE};
pub use rng::{RandomSource, SeededSource};
pub use sampler::{JobAttributes, PRODUCTIVITY_FLOOR};

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_NUM_JOBS: i64 = 50;
pub const DEFAULT_ARRIVAL_RATE_MINUTES: f64 = 30.0;
/// Largest batch one call may generate. Larger counts are rejected before
/// anything is allocated.
pub const MAX_NUM_JOBS: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// One generated job: sampled attributes plus its arrival times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSample {
    pub job_id: u64,
    pub crop_type: CropType,
    pub quantity_units: i64,
    pub unit_type: UnitType,
    pub crew_size: i64,
    pub pay_rate: f64,
    pub service_time_minutes: f64,
    pub total_value: f64,
    pub arrival_time_constant: f64,
    pub arrival_time_poisson: f64,
}

impl JobSample {
    fn from_parts(attrs: JobAttributes, constant: f64, poisson: f64) -> Self {
        JobSample {
            job_id: attrs.job_id,
            crop_type: attrs.crop_type,
            quantity_units: attrs.quantity_units,
            unit_type: attrs.unit_type,
            crew_size: attrs.crew_size,
            pay_rate: attrs.pay_rate,
            service_time_minutes: attrs.service_time_minutes,
            total_value: attrs.total_value,
            arrival_time_constant: constant,
            arrival_time_poisson: poisson,
        }
    }

    /// Arrival offset in minutes under `model`.
    pub fn arrival_time(&self, model: ArrivalModel) -> f64 {
        match model {
            ArrivalModel::Constant => self.arrival_time_constant,
            ArrivalModel::Poisson => self.arrival_time_poisson,
        }
    }
}

/// Parameters of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub num_jobs: i64,
    /// Mean Poisson inter-arrival gap.
    pub arrival_rate_minutes: f64,
    /// Fixed gap of the constant schedule; defaults to `arrival_rate_minutes`.
    pub constant_interval_minutes: Option<f64>,
}

impl SimulationParams {
    pub fn new(num_jobs: i64, arrival_rate_minutes: f64) -> Self {
        SimulationParams {
            num_jobs,
            arrival_rate_minutes,
            constant_interval_minutes: None,
        }
    }

    pub fn with_constant_interval(mut self, minutes: f64) -> Self {
        self.constant_interval_minutes = Some(minutes);
        self
    }

    pub fn constant_interval(&self) -> f64 {
        self.constant_interval_minutes
            .unwrap_or(self.arrival_rate_minutes)
    }

    /// Check the parameters and return the job count.
    pub fn validate(&self) -> Result<usize, SimulationError> {
        if self.num_jobs < 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "num_jobs must be non-negative, got {}",
                self.num_jobs
            )));
        }
        if self.num_jobs > MAX_NUM_JOBS {
            return Err(SimulationError::InvalidArgument(format!(
                "num_jobs must be at most {}, got {}",
                MAX_NUM_JOBS, self.num_jobs
            )));
        }
        if !(self.arrival_rate_minutes.is_finite() && self.arrival_rate_minutes > 0.0) {
            return Err(SimulationError::InvalidArgument(format!(
                "arrival_rate_minutes must be positive, got {}",
                self.arrival_rate_minutes
            )));
        }
        let interval = self.constant_interval();
        if !(interval.is_finite() && interval > 0.0) {
            return Err(SimulationError::InvalidArgument(format!(
                "constant_interval_minutes must be positive, got {}",
                interval
            )));
        }
        usize::try_from(self.num_jobs).map_err(|_| {
            SimulationError::InvalidArgument(format!("num_jobs {} is too large", self.num_jobs))
        })
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams::new(DEFAULT_NUM_JOBS, DEFAULT_ARRIVAL_RATE_MINUTES)
    }
}

/// Generate `num_jobs` jobs from a `StdRng` seeded with `seed`.
///
/// The constant schedule uses `arrival_rate_minutes` as its interval.
pub fn generate(
    num_jobs: i64,
    arrival_rate_minutes: f64,
    seed: u64,
) -> Result<Vec<JobSample>, SimulationError> {
    let params = SimulationParams::new(num_jobs, arrival_rate_minutes);
    let mut rng = SeededSource::new(seed);
    generate_with(&params, &mut rng)
}

/// Generate jobs drawing from a caller-supplied random source.
///
/// Parameters are validated before any draw, so a failed call leaves `rng`
/// untouched.
pub fn generate_with<R: RandomSource + ?Sized>(
    params: &SimulationParams,
    rng: &mut R,
) -> Result<Vec<JobSample>, SimulationError> {
    let num_jobs = params.validate()?;

    let attributes = sampler::sample_jobs(num_jobs, rng);
    let schedule = arrivals::schedule(
        num_jobs,
        params.constant_interval(),
        params.arrival_rate_minutes,
        rng,
    );

    Ok(attributes
        .into_iter()
        .zip(schedule.constant)
        .zip(schedule.poisson)
        .map(|((attrs, constant), poisson)| JobSample::from_parts(attrs, constant, poisson))
        .collect())
}
