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

//! Per-column outlier summaries over preprocessed trips

use crate::anomaly::statistical::{iqr_anomalies, iqr_bounds, zscore_anomalies, OutlierBounds};
use crate::config::AnalysisConfig;
use crate::core::TripRecord;
use crate::error::{Result, TripError};
use rayon::prelude::*;
use serde::Serialize;

/// Outlier indices for one column, as positions in the input trip slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub column: String,
    /// Trips with a numeric value in this column
    pub count: usize,
    pub bounds: OutlierBounds,
    pub zscore_outliers: Vec<usize>,
    pub iqr_outliers: Vec<usize>,
}

/// Run both statistical detectors over one column.
///
/// Trips without a numeric value for `column` are skipped. Fails with
/// [`TripError::EmptyInput`] when no trip has one.
pub fn column_outliers(
    trips: &[TripRecord],
    column: &str,
    config: &AnalysisConfig,
) -> Result<ColumnReport> {
    let (indices, values): (Vec<usize>, Vec<f64>) = trips
        .iter()
        .enumerate()
        .filter_map(|(i, trip)| trip.column(column).map(|v| (i, v)))
        .unzip();

    if values.is_empty() {
        tracing::warn!("Column {column} has no numeric values");
        return Err(TripError::EmptyInput);
    }

    let zscore = zscore_anomalies(&values, config.zscore_threshold)?;
    let iqr = iqr_anomalies(&values, config.iqr_multiplier)?;
    let bounds = iqr_bounds(&values, config.iqr_multiplier)?;

    let pick = |flags: &[bool]| -> Vec<usize> {
        indices
            .iter()
            .zip(flags)
            .filter_map(|(&i, &flagged)| flagged.then_some(i))
            .collect()
    };

    let report = ColumnReport {
        column: column.to_string(),
        count: values.len(),
        bounds,
        zscore_outliers: pick(&zscore),
        iqr_outliers: pick(&iqr),
    };
    tracing::info!(
        "{column}: {} values, {} z-score outliers, {} IQR outliers",
        report.count,
        report.zscore_outliers.len(),
        report.iqr_outliers.len()
    );
    Ok(report)
}

/// [`column_outliers`] for several columns at once, in the order given
pub fn scan(
    trips: &[TripRecord],
    columns: &[String],
    config: &AnalysisConfig,
) -> Result<Vec<ColumnReport>> {
    columns
        .par_iter()
        .map(|column| column_outliers(trips, column, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RawRow, RawValue, Timestamp};

    fn trip(duration: f64, fare: Option<f64>) -> TripRecord {
        let pickup =
            Timestamp::parse_from_rfc3339("2024-02-01T12:00:00Z").expect("valid timestamp");
        let mut columns = RawRow::new();
        if let Some(fare) = fare {
            columns.insert("fare_amount".to_string(), RawValue::Number(fare));
        }
        TripRecord {
            pickup_datetime: pickup,
            dropoff_datetime: pickup,
            trip_duration: duration,
            pickup_hour: 12,
            pickup_day: 1,
            pickup_month: 2,
            pickup_dayofweek: 3,
            columns,
        }
    }

    #[test]
    fn test_indices_refer_to_input_positions() {
        let mut trips: Vec<TripRecord> = (1..=9).map(|d| trip(f64::from(d), Some(10.0))).collect();
        trips.insert(0, trip(5.0, None));
        trips.push(trip(100.0, Some(10.0)));

        let report = column_outliers(&trips, "trip_duration", &AnalysisConfig::default())
            .expect("has values");
        assert_eq!(report.count, 11);
        assert_eq!(report.iqr_outliers, vec![10]);

        let fares = column_outliers(&trips, "fare_amount", &AnalysisConfig::default())
            .expect("has values");
        assert_eq!(fares.count, 10);
        assert!(fares.zscore_outliers.is_empty());
        assert!(fares.iqr_outliers.is_empty());
    }

    #[test]
    fn test_missing_column_is_empty_input() {
        let trips = vec![trip(5.0, None)];
        let err = column_outliers(&trips, "tip_amount", &AnalysisConfig::default())
            .expect_err("no values");
        assert!(matches!(err, TripError::EmptyInput));
    }

    #[test]
    fn test_scan_keeps_column_order() {
        let trips: Vec<TripRecord> = (1..=5).map(|d| trip(f64::from(d), Some(7.0))).collect();
        let columns = vec!["fare_amount".to_string(), "trip_duration".to_string()];
        let reports = scan(&trips, &columns, &AnalysisConfig::default()).expect("has values");
        let names: Vec<&str> = reports.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(names, vec!["fare_amount", "trip_duration"]);
    }
}
