//! Job-attribute sampler.
//!
//! Draws happen in two sequential passes over one random stream: all crop
//! types first, then per job `quantity, crew, pay rate, productivity`. The
//! derived fields (service time, payout) are computed afterwards from the
//! materialized draws on the rayon pool, which never touches the stream.

use rayon::prelude::*;
use serde::Serialize;

use super::crops::{select_crop, CropType, UnitType};
use super::rng::RandomSource;

/// Lower bound applied to a sampled productivity rate before dividing by it.
/// The normal draw has unbounded support; this keeps duration finite and
/// non-negative.
pub const PRODUCTIVITY_FLOOR: f64 = 0.1;

/// Raw per-job draws, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDraw {
    pub crop_type: CropType,
    pub quantity_units: i64,
    pub crew_size: i64,
    pub pay_rate: f64,
    pub productivity_rate: f64,
}

impl RawDraw {
    /// Whether the productivity draw hit the clamp floor.
    pub fn is_degenerate(&self) -> bool {
        self.productivity_rate <= PRODUCTIVITY_FLOOR
    }
}

/// Sampled attributes of one job, without arrival times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAttributes {
    pub job_id: u64,
    pub crop_type: CropType,
    pub quantity_units: i64,
    pub unit_type: UnitType,
    pub crew_size: i64,
    pub pay_rate: f64,
    pub service_time_minutes: f64,
    pub total_value: f64,
}

/// Round half-to-even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Draw one crop type per job.
pub fn draw_crops<R: RandomSource + ?Sized>(num_jobs: usize, rng: &mut R) -> Vec<CropType> {
    (0..num_jobs).map(|_| select_crop(rng.next_unit())).collect()
}

/// Draw the crop-conditional parameters for each crop, in job order.
pub fn draw_attributes<R: RandomSource + ?Sized>(crops: &[CropType], rng: &mut R) -> Vec<RawDraw> {
    crops
        .iter()
        .map(|&crop_type| {
            let profile = crop_type.profile();
            let quantity_units = rng.uniform_int(profile.quantity_range.clone());
            let crew_size = rng.uniform_int(profile.crew_range.clone());
            let pay_rate = round_to(rng.uniform_f64(profile.pay_range.clone()), 2);
            let productivity_rate = rng.normal(profile.productivity_mean, profile.productivity_sd);
            RawDraw {
                crop_type,
                quantity_units,
                crew_size,
                pay_rate,
                productivity_rate,
            }
        })
        .collect()
}

/// Derive service time and payout from one job's draws.
pub fn derive(job_id: u64, raw: &RawDraw) -> JobAttributes {
    let rate = raw.productivity_rate.max(PRODUCTIVITY_FLOOR);
    let duration_hours = raw.quantity_units as f64 / (raw.crew_size as f64 * rate);
    JobAttributes {
        job_id,
        crop_type: raw.crop_type,
        quantity_units: raw.quantity_units,
        unit_type: raw.crop_type.unit_type(),
        crew_size: raw.crew_size,
        pay_rate: raw.pay_rate,
        service_time_minutes: round_to(duration_hours * 60.0, 1),
        total_value: round_to(raw.quantity_units as f64 * raw.pay_rate, 2),
    }
}

/// Sample `num_jobs` attribute tuples. Job ids run `1..=num_jobs`.
pub fn sample_jobs<R: RandomSource + ?Sized>(num_jobs: usize, rng: &mut R) -> Vec<JobAttributes> {
    let crops = draw_crops(num_jobs, rng);
    let draws = draw_attributes(&crops, rng);

    let degenerate = draws.iter().filter(|d| d.is_degenerate()).count();
    if degenerate > 0 {
        tracing::debug!(count = degenerate, "productivity draws clamped to floor");
    }

    draws
        .par_iter()
        .enumerate()
        .map(|(i, raw)| derive(i as u64 + 1, raw))
        .collect()
}
