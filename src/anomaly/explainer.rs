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

use super::features::FeatureVector;
use super::scorer::{FeatureScaler, PointClassifier, ANOMALY_LABEL};
use crate::core::TripFields;
use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trips longer than this many minutes get an explanation when flagged
pub const DURATION_THRESHOLD: f64 = 60.0;
/// Trips farther than this many miles get an explanation when flagged
pub const DISTANCE_THRESHOLD: f64 = 20.0;
/// Fares above this amount get an explanation when flagged
pub const FARE_THRESHOLD: f64 = 100.0;

/// Rule thresholds for the human-readable explanations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationThresholds {
    pub duration_minutes: f64,
    pub distance_miles: f64,
    pub fare: f64,
}

impl Default for ExplanationThresholds {
    fn default() -> Self {
        Self {
            duration_minutes: DURATION_THRESHOLD,
            distance_miles: DISTANCE_THRESHOLD,
            fare: FARE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    PointAnomaly,
}

impl AnomalyType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointAnomaly => "point_anomaly",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one trip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub is_anomaly: bool,
    pub anomaly_type: Vec<AnomalyType>,
    pub explanation: Vec<String>,
}

/// Classify one trip with the default explanation thresholds
pub fn detect<C, S>(fields: &TripFields, classifier: &C, scaler: &S) -> Result<AnomalyResult>
where
    C: PointClassifier + ?Sized,
    S: FeatureScaler + ?Sized,
{
    detect_with_thresholds(
        fields,
        classifier,
        scaler,
        &ExplanationThresholds::default(),
    )
}

/// Classify one trip.
///
/// The raw fields are laid out as a [`FeatureVector`] (missing features are 0),
/// scaled, and handed to the classifier. A flagged trip is tagged
/// `point_anomaly` and explained by simple per-field rules that are
/// independent of how the classifier reached its verdict.
pub fn detect_with_thresholds<C, S>(
    fields: &TripFields,
    classifier: &C,
    scaler: &S,
    thresholds: &ExplanationThresholds,
) -> Result<AnomalyResult>
where
    C: PointClassifier + ?Sized,
    S: FeatureScaler + ?Sized,
{
    let mut results = detect_batch(std::slice::from_ref(fields), classifier, scaler, thresholds)?;
    results
        .pop()
        .ok_or_else(|| TripError::Model("no verdict for a single trip".to_string()))
}

/// Classify many trips with a single scaler and classifier call.
/// Results are in input order.
pub fn detect_batch<C, S>(
    trips: &[TripFields],
    classifier: &C,
    scaler: &S,
    thresholds: &ExplanationThresholds,
) -> Result<Vec<AnomalyResult>>
where
    C: PointClassifier + ?Sized,
    S: FeatureScaler + ?Sized,
{
    if trips.is_empty() {
        return Ok(Vec::new());
    }

    let features: Vec<FeatureVector> = trips.iter().map(FeatureVector::from_fields).collect();

    let scaled = scaler.transform(&features)?;
    if scaled.len() != features.len() {
        return Err(TripError::Model(format!(
            "scaler returned {} rows for {} inputs",
            scaled.len(),
            features.len()
        )));
    }

    let labels = classifier.predict(&scaled)?;
    if labels.len() != scaled.len() {
        return Err(TripError::Model(format!(
            "classifier returned {} labels for {} rows",
            labels.len(),
            scaled.len()
        )));
    }

    let results = trips
        .iter()
        .zip(&features)
        .zip(labels)
        .map(|((fields, raw), label)| {
            let is_anomaly = label == ANOMALY_LABEL;
            tracing::trace!("label {label} -> anomaly={is_anomaly}");
            if is_anomaly {
                AnomalyResult {
                    is_anomaly,
                    anomaly_type: vec![AnomalyType::PointAnomaly],
                    explanation: reasons(raw, fields, thresholds),
                }
            } else {
                AnomalyResult::default()
            }
        })
        .collect();

    Ok(results)
}

/// Rule-based reasons a trip looks unusual, in feature layout order
#[must_use]
pub fn explain(fields: &TripFields, thresholds: &ExplanationThresholds) -> Vec<String> {
    reasons(&FeatureVector::from_fields(fields), fields, thresholds)
}

/// Only features the trip actually carries are explained, never the zero fill
fn reasons(
    raw: &FeatureVector,
    fields: &TripFields,
    thresholds: &ExplanationThresholds,
) -> Vec<String> {
    raw.named()
        .filter(|(name, _)| fields.contains_key(*name))
        .filter_map(|(name, value)| match name {
            "trip_duration" if value > thresholds.duration_minutes => {
                Some(format!("Unusually long trip: {value:.1} minutes"))
            }
            "trip_distance" if value > thresholds.distance_miles => {
                Some(format!("Unusually long distance: {value:.1} miles"))
            }
            "fare_amount" if value > thresholds.fare => {
                Some(format!("Unusually high fare: ${value:.2}"))
            }
            _ => None,
        })
        .collect()
}
