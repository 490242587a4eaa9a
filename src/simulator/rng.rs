//! Pseudo-random source used by the simulator.
//!
//! Generation takes an explicit `&mut impl RandomSource` rather than a global
//! generator. Only [`RandomSource::next_unit`] is required; the integer,
//! continuous, normal and exponential draws are derived from it, so an
//! alternative backend reproduces the same distributions as long as it
//! honours the same draw order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in the half-open `range`. Consumes one draw.
    fn uniform_int(&mut self, range: Range<i64>) -> i64 {
        debug_assert!(range.start < range.end, "empty integer range");
        let span = (range.end - range.start) as f64;
        let offset = (self.next_unit() * span) as i64;
        range.start + offset.min(range.end - range.start - 1)
    }

    /// Uniform float in the half-open `range`. Consumes one draw.
    fn uniform_f64(&mut self, range: Range<f64>) -> f64 {
        range.start + (range.end - range.start) * self.next_unit()
    }

    /// Normal draw via the Box-Muller transform. Consumes two draws.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // 1 - u keeps the log argument in (0, 1]
        let u1 = 1.0 - self.next_unit();
        let u2 = self.next_unit();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Exponential draw with the given mean (inverse CDF). Consumes one draw.
    fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_unit()).ln()
    }
}

/// [`RandomSource`] backed by a seeded `StdRng`.
pub struct SeededSource {
    rng: StdRng,
    seed: u64,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        SeededSource {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}
