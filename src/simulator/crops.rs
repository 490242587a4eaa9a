//! Crop lookup table.
//!
//! Every crop-conditional sampling parameter lives in [`CROP_TABLE`], one
//! [`CropProfile`] per [`CropType`]. The sampler only ever reads profiles, so
//! adding a crop means adding a variant and a table row.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Crop category of a harvest job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropType {
    Tomato,
    Strawberry,
}

/// Unit in which a job's quantity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Buckets,
    Flats,
}

/// Sampling parameters and presentation labels for one crop.
///
/// Integer ranges are half-open. `pay_range` is drawn half-open and then
/// rounded to cents, so the rounded rate may land on `pay_range.end`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropProfile {
    pub crop: CropType,
    /// Relative selection weight; weights are normalized over the table.
    pub selection_weight: f64,
    pub quantity_range: Range<i64>,
    pub crew_range: Range<i64>,
    pub pay_range: Range<f64>,
    /// Units picked per worker per hour.
    pub productivity_mean: f64,
    pub productivity_sd: f64,
    pub unit: UnitType,
    pub job_title: &'static str,
    /// Singular unit label used in pay strings ("$5.20/bucket").
    pub pay_unit: &'static str,
}

/// Table order defines the categorical draw order: a uniform draw `u` picks
/// the first crop whose cumulative normalized weight exceeds `u`.
pub static CROP_TABLE: [CropProfile; 2] = [
    CropProfile {
        crop: CropType::Tomato,
        selection_weight: 0.6,
        quantity_range: 1000..3000,
        crew_range: 20..40,
        pay_range: 5.0..8.0,
        productivity_mean: 22.0,
        productivity_sd: 3.0,
        unit: UnitType::Buckets,
        job_title: "Tomato Picker",
        pay_unit: "bucket",
    },
    CropProfile {
        crop: CropType::Strawberry,
        selection_weight: 0.4,
        quantity_range: 500..1500,
        crew_range: 15..30,
        pay_range: 30.0..45.0,
        productivity_mean: 7.0,
        productivity_sd: 1.5,
        unit: UnitType::Flats,
        job_title: "Strawberry Harvester",
        pay_unit: "flat",
    },
];

impl CropType {
    pub const ALL: [CropType; 2] = [CropType::Tomato, CropType::Strawberry];

    pub fn profile(self) -> &'static CropProfile {
        match self {
            CropType::Tomato => &CROP_TABLE[0],
            CropType::Strawberry => &CROP_TABLE[1],
        }
    }

    pub fn unit_type(self) -> UnitType {
        self.profile().unit
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CropType::Tomato => "Tomato",
            CropType::Strawberry => "Strawberry",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<CropType> {
        CropType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Buckets => "Buckets",
            UnitType::Flats => "Flats",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a uniform draw in `[0, 1)` to a crop via the table's cumulative weights.
pub fn select_crop(u: f64) -> CropType {
    let total: f64 = CROP_TABLE.iter().map(|p| p.selection_weight).sum();
    let mut cumulative = 0.0;
    for profile in &CROP_TABLE {
        cumulative += profile.selection_weight / total;
        if u < cumulative {
            return profile.crop;
        }
    }
    // u within rounding error of 1.0
    CROP_TABLE[CROP_TABLE.len() - 1].crop
}
