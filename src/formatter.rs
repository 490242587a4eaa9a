//! Maps simulator output onto job postings served by the API.
//!
//! A [`JobPosting`] is the presentation/persistence record: absolute date,
//! human-readable title and pay string, farm location, plus the simulation
//! metadata it was built from. Postings created by hand through the API have
//! no simulation metadata.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulator::{ArrivalModel, CropType, JobSample};

/// Farm labels assigned round-robin by `job_id % FARM_LABELS.len()`.
pub const FARM_LABELS: [&str; 6] = ["Farm A", "Farm B", "Farm C", "Farm D", "Farm E", "Farm F"];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the base timestamp that arrival offsets are added to.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant (tests, reproducible exports).
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("job {job_id} arrives {minutes} minutes after the base date, outside the supported date range")]
    DateOutOfRange { job_id: u64, minutes: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: i64,
    pub title: String,
    pub pay: String,
    pub location: String,
    pub date: String,
    pub description: Option<String>,
    pub crop_type: Option<CropType>,
    pub quantity: Option<i64>,
    pub workers_requested: Option<i64>,
    pub pay_rate_mxn: Option<f64>,
    pub total_value_mxn: Option<f64>,
    pub service_time_mins: Option<f64>,
    pub arrival_time_poisson: Option<f64>,
}

fn offset(minutes: f64) -> Option<Duration> {
    let micros = (minutes * 60_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

fn arrival_date(base: DateTime<Utc>, minutes: f64) -> Option<DateTime<Utc>> {
    base.checked_add_signed(offset(minutes)?)
}

pub fn farm_label(job_id: u64) -> &'static str {
    FARM_LABELS[(job_id % FARM_LABELS.len() as u64) as usize]
}

/// Build the posting for one sample, dated `base + arrival(model)` minutes.
pub fn format_job(
    sample: &JobSample,
    model: ArrivalModel,
    base: DateTime<Utc>,
) -> Result<JobPosting, FormatError> {
    let profile = sample.crop_type.profile();
    let minutes = sample.arrival_time(model);
    let date = arrival_date(base, minutes).ok_or(FormatError::DateOutOfRange {
        job_id: sample.job_id,
        minutes,
    })?;
    let description = format!(
        "{} harvesting job. Quantity: {} {}. Workers needed: {}. Estimated duration: {} minutes.",
        sample.crop_type,
        sample.quantity_units,
        sample.unit_type,
        sample.crew_size,
        sample.service_time_minutes.trunc() as i64,
    );

    Ok(JobPosting {
        id: sample.job_id as i64,
        title: profile.job_title.to_string(),
        pay: format!("${:.2}/{}", sample.pay_rate, profile.pay_unit),
        location: farm_label(sample.job_id).to_string(),
        date: date.format(DATE_FORMAT).to_string(),
        description: Some(description),
        crop_type: Some(sample.crop_type),
        quantity: Some(sample.quantity_units),
        workers_requested: Some(sample.crew_size),
        pay_rate_mxn: Some(sample.pay_rate),
        total_value_mxn: Some(sample.total_value),
        service_time_mins: Some(sample.service_time_minutes),
        arrival_time_poisson: Some(sample.arrival_time_poisson),
    })
}

/// Format a batch; fails on the first sample whose date cannot be represented.
pub fn format_jobs(
    samples: &[JobSample],
    model: ArrivalModel,
    base: DateTime<Utc>,
) -> Result<Vec<JobPosting>, FormatError> {
    samples.iter().map(|s| format_job(s, model, base)).collect()
}
