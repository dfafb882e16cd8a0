// TripCrab - GPL-3.0-or-later
// This file is part of TripCrab.
//
// Copyright (C) 2026 TripCrab contributors
//
// TripCrab is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// TripCrab is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with TripCrab.  If not, see <https://www.gnu.org/licenses/>.

//! Z-score and IQR outlier flags over a numeric sequence.
//!
//! Both detectors are pure: the returned flags line up index-for-index with
//! the input and nothing is cached between calls.

use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Inclusive fences; values strictly outside are outliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Flag values whose population z-score exceeds `threshold` in magnitude.
///
/// Zero-variance input yields no anomalies.
pub fn zscore_anomalies(data: &[f64], threshold: f64) -> Result<Vec<bool>> {
    check_parameter("threshold", threshold)?;
    match zscore_scores(data) {
        Ok(scores) => Ok(scores.iter().map(|z| z.abs() > threshold).collect()),
        Err(TripError::DegenerateInput) => Ok(vec![false; data.len()]),
        Err(e) => Err(e),
    }
}

/// Population z-score of every value.
/// Fails with [`TripError::DegenerateInput`] when all values are equal.
pub fn zscore_scores(data: &[f64]) -> Result<Vec<f64>> {
    let (mean, std) = mean_and_std(data)?;
    // Rounding in the mean can leave a few ulps of spread on constant input
    if std == 0.0 || data.iter().all(|&y| y == data[0]) {
        return Err(TripError::DegenerateInput);
    }
    Ok(data.iter().map(|y| (y - mean) / std).collect())
}

/// Flag values outside `[Q1 - multiplier*IQR, Q3 + multiplier*IQR]`
pub fn iqr_anomalies(data: &[f64], multiplier: f64) -> Result<Vec<bool>> {
    let bounds = iqr_bounds(data, multiplier)?;
    Ok(data.iter().map(|&y| bounds.is_outlier(y)).collect())
}

/// Tukey fences for `data`, quartiles by linear interpolation
pub fn iqr_bounds(data: &[f64], multiplier: f64) -> Result<OutlierBounds> {
    check_parameter("multiplier", multiplier)?;
    if data.is_empty() {
        return Err(TripError::EmptyInput);
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile(&sorted, 25.0).ok_or(TripError::EmptyInput)?;
    let q3 = percentile(&sorted, 75.0).ok_or(TripError::EmptyInput)?;
    let iqr = q3 - q1;

    Ok(OutlierBounds {
        q1,
        q3,
        lower: multiplier.mul_add(-iqr, q1),
        upper: multiplier.mul_add(iqr, q3),
    })
}

/// The `q`-th percentile (0-100) of already sorted data.
///
/// Interpolates linearly between the two closest ranks, so the 25th
/// percentile of ten values sits a quarter of the way from the 3rd to the
/// 4th value.
#[must_use]
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(fraction.mul_add(sorted[upper] - sorted[lower], sorted[lower]))
}

fn mean_and_std(data: &[f64]) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(TripError::EmptyInput);
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    Ok((mean, variance.sqrt()))
}

fn check_parameter(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TripError::Config(format!("{name} must be finite, got {value}")))
    }
}
