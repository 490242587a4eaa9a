//! Arrival scheduler: constant-interval and Poisson-process arrival times.
//!
//! Both schedules are cumulative sums of inter-arrival gaps, so the first job
//! arrives after one gap rather than at zero. Poisson gaps are drawn from the
//! shared stream after the sampler has finished with it.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// Which arrival sequence a consumer uses to place a job in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalModel {
    Constant,
    #[default]
    Poisson,
}

impl std::str::FromStr for ArrivalModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(ArrivalModel::Constant),
            "poisson" => Ok(ArrivalModel::Poisson),
            other => Err(format!("unknown arrival model '{}'", other)),
        }
    }
}

/// Both arrival sequences for one generation call, indexed by job position.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalSchedule {
    pub constant: Vec<f64>,
    pub poisson: Vec<f64>,
}

fn cumulative(gaps: impl Iterator<Item = f64>) -> Vec<f64> {
    gaps.scan(0.0, |acc, gap| {
        *acc += gap;
        Some(*acc)
    })
    .collect()
}

/// Arrival times for a fixed inter-arrival interval.
pub fn constant_arrivals(num_jobs: usize, interval_minutes: f64) -> Vec<f64> {
    cumulative(std::iter::repeat(interval_minutes).take(num_jobs))
}

/// Arrival times of a Poisson process with mean gap `mean_gap_minutes`.
/// Consumes `num_jobs` draws.
pub fn poisson_arrivals<R: RandomSource + ?Sized>(
    num_jobs: usize,
    mean_gap_minutes: f64,
    rng: &mut R,
) -> Vec<f64> {
    let gaps: Vec<f64> = (0..num_jobs)
        .map(|_| rng.exponential(mean_gap_minutes))
        .collect();
    cumulative(gaps.into_iter())
}

/// Build both schedules. The constant schedule consumes no draws.
pub fn schedule<R: RandomSource + ?Sized>(
    num_jobs: usize,
    interval_minutes: f64,
    mean_gap_minutes: f64,
    rng: &mut R,
) -> ArrivalSchedule {
    ArrivalSchedule {
        constant: constant_arrivals(num_jobs, interval_minutes),
        poisson: poisson_arrivals(num_jobs, mean_gap_minutes, rng),
    }
}
