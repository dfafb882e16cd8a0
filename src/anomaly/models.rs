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

//! Reference scaler and classifier.
//!
//! Trained Isolation Forests live outside this crate. These stand-ins let the
//! pipeline run end to end on a fresh dataset: fit the scaler on the trips
//! themselves and flag rows that sit far from the mean in any feature.

use super::features::{FeatureVector, FEATURE_COUNT};
use super::scorer::{FeatureScaler, PointClassifier, ANOMALY_LABEL, NORMAL_LABEL};
use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};

/// Per-feature standardization: `(x - mean) / std`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Learn population mean and standard deviation of every feature.
    /// Constant features get a scale of 1 so they map to 0.
    pub fn fit(rows: &[FeatureVector]) -> Result<Self> {
        if rows.is_empty() {
            return Err(TripError::EmptyInput);
        }
        let n = rows.len() as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row.values()) {
                *m += v / n;
            }
        }

        let mut scale = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((s, v), m) in scale.iter_mut().zip(row.values()).zip(&mean) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in &mut scale {
            *s = s.sqrt();
            if *s == 0.0 || !s.is_finite() {
                *s = 1.0;
            }
        }

        tracing::debug!("Fitted scaler on {} rows: mean={mean:?} scale={scale:?}", rows.len());
        Ok(Self { mean, scale })
    }

    #[must_use]
    pub const fn mean(&self) -> &[f64; FEATURE_COUNT] {
        &self.mean
    }

    #[must_use]
    pub const fn scale(&self) -> &[f64; FEATURE_COUNT] {
        &self.scale
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>> {
        Ok(rows
            .iter()
            .map(|row| {
                let mut out = [0.0; FEATURE_COUNT];
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = (row.values()[i] - self.mean[i]) / self.scale[i];
                }
                FeatureVector::from_values(out)
            })
            .collect())
    }
}

/// Flags a row when any standardized feature exceeds the threshold in magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScoreClassifier {
    threshold: f64,
}

impl ZScoreClassifier {
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(TripError::Config(format!(
                "classifier threshold must be finite, got {threshold}"
            )));
        }
        Ok(Self {
            threshold: threshold.abs(),
        })
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl PointClassifier for ZScoreClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i32>> {
        Ok(rows
            .iter()
            .map(|row| {
                if row.values().iter().any(|v| v.abs() > self.threshold) {
                    ANOMALY_LABEL
                } else {
                    NORMAL_LABEL
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(duration: f64, fare: f64) -> FeatureVector {
        FeatureVector::from_values([duration, 12.0, 2.0, 3.0, fare, 1.0])
    }

    #[test]
    fn test_scaler_centers_and_scales() {
        let rows = vec![row(10.0, 10.0), row(20.0, 30.0)];
        let scaler = StandardScaler::fit(&rows).expect("non-empty");
        assert_eq!(scaler.mean()[0], 15.0);
        assert_eq!(scaler.scale()[0], 5.0);
        // Constant pickup_hour column
        assert_eq!(scaler.scale()[1], 1.0);

        let scaled = scaler.transform(&rows).expect("infallible");
        assert_eq!(scaled[0].values()[0], -1.0);
        assert_eq!(scaled[1].values()[0], 1.0);
        assert_eq!(scaled[0].values()[1], 0.0);
    }

    #[test]
    fn test_scaler_rejects_empty() {
        assert!(matches!(StandardScaler::fit(&[]), Err(TripError::EmptyInput)));
    }

    #[test]
    fn test_classifier_labels() {
        let classifier = ZScoreClassifier::new(-2.0).expect("finite");
        assert_eq!(classifier.threshold(), 2.0);
        let rows = [
            FeatureVector::from_values([0.5, -1.0, 0.0, 0.0, 0.0, 0.0]),
            FeatureVector::from_values([0.0, 0.0, 0.0, -2.5, 0.0, 0.0]),
        ];
        let labels = classifier.predict(&rows).expect("infallible");
        assert_eq!(labels, vec![NORMAL_LABEL, ANOMALY_LABEL]);
    }

    #[test]
    fn test_classifier_rejects_nan() {
        assert!(ZScoreClassifier::new(f64::NAN).is_err());
    }
}
