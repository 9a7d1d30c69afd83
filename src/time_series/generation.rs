//! Synthetic series generators.
//!
//! Small helpers producing daily univariate series, used by the test suites
//! and benchmarks. Gaussian sampling is seeded for reproducibility.

use crate::error::{Error, Result};
use crate::time_series::core::{DateTimeIndex, Frequency, TimeSeries};
use chrono::DateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 2022-01-01T00:00:00Z, the first timestamp of every generated series.
const EPOCH_SECONDS: i64 = 1_640_995_200;

fn daily_index(length: usize) -> Result<DateTimeIndex> {
    let timestamps = (0..length)
        .map(|i| {
            DateTime::from_timestamp(EPOCH_SECONDS + i as i64 * 86400, 0).ok_or_else(|| {
                Error::Data(format!("timestamp out of range at position {}", i))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    DateTimeIndex::with_frequency(timestamps, Frequency::Daily)
}

/// Univariate daily series of independent gaussian draws.
pub fn gaussian_series(length: usize, mean: f64, std: f64, seed: u64) -> Result<TimeSeries> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(length);
    while values.len() < length {
        // Box-Muller transform; u1 shifted into (0, 1] to keep ln finite.
        let u1: f64 = 1.0 - rng.random::<f64>();
        let u2: f64 = rng.random();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * u2;
        values.push(mean + std * radius * angle.cos());
        if values.len() < length {
            values.push(mean + std * radius * angle.sin());
        }
    }
    TimeSeries::univariate(daily_index(length)?, values)?.with_name("gaussian")
}

/// Univariate daily series holding a constant value.
pub fn constant_series(length: usize, value: f64) -> Result<TimeSeries> {
    TimeSeries::univariate(daily_index(length)?, vec![value; length])?.with_name("constant")
}

/// Univariate daily series following `start + slope * t`.
pub fn linear_series(length: usize, start: f64, slope: f64) -> Result<TimeSeries> {
    let values = (0..length).map(|t| start + slope * t as f64).collect();
    TimeSeries::univariate(daily_index(length)?, values)?.with_name("linear")
}
