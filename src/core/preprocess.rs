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

use super::trip::{TripRecord, DERIVED_FIELDS};
use crate::error::{Result, TripError};
use crate::parser::{RawRow, RawValue, Timestamp, TripTable};
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

/// Accepted pickup timestamp columns, highest priority first
pub const PICKUP_COLUMNS: &[&str] = &["tpep_pickup_datetime", "pickup_datetime"];
/// Accepted dropoff timestamp columns, highest priority first
pub const DROPOFF_COLUMNS: &[&str] = &["tpep_dropoff_datetime", "dropoff_datetime"];
pub const DISTANCE_COLUMN: &str = "trip_distance";
/// Fare-like columns, highest priority first
pub const FARE_COLUMNS: &[&str] = &["fare_amount", "total_amount"];

/// Bounds used to discard implausible trips
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Minutes
    pub min_duration: f64,
    /// Minutes
    pub max_duration: f64,
    /// Miles
    pub min_distance: f64,
    /// Miles
    pub max_distance: f64,
    pub min_fare: f64,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            min_duration: 1.0,
            max_duration: 24.0 * 60.0,
            min_distance: 0.1,
            max_distance: 100.0,
            min_fare: 2.5,
        }
    }
}

impl PreprocessOptions {
    /// Reject bounds that can never admit a trip
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("min_duration", self.min_duration),
            ("max_duration", self.max_duration),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("min_fare", self.min_fare),
        ];
        if let Some((name, value)) = bounds.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TripError::Config(format!("{name} must be finite, got {value}")));
        }
        if self.min_duration > self.max_duration {
            return Err(TripError::Config(format!(
                "min_duration {} exceeds max_duration {}",
                self.min_duration, self.max_duration
            )));
        }
        if self.min_distance > self.max_distance {
            return Err(TripError::Config(format!(
                "min_distance {} exceeds max_distance {}",
                self.min_distance, self.max_distance
            )));
        }
        Ok(())
    }
}

/// Row counts remaining after each filter stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreprocessSummary {
    pub input_rows: usize,
    /// Rows with parseable pickup and dropoff timestamps
    pub timestamped: usize,
    pub after_duration: usize,
    pub after_distance: usize,
    pub after_fare: usize,
    pub distance_filter_applied: bool,
    pub fare_column: Option<&'static str>,
}

/// Clean raw trips and derive temporal features. See [`preprocess_with_summary`].
pub fn preprocess(table: &TripTable, options: &PreprocessOptions) -> Result<Vec<TripRecord>> {
    preprocess_with_summary(table, options).map(|(trips, _)| trips)
}

/// Clean raw trips and derive temporal features.
///
/// Keeps rows whose duration lies in `[min_duration, max_duration]`; when the
/// table has a `trip_distance` column, whose distance lies in
/// `[min_distance, max_distance]`; and when a fare-like column exists, whose
/// fare is at least `min_fare`. A row lacking a usable value for a column that
/// exists in the table fails that column's filter.
///
/// Fails with [`TripError::Schema`] when neither accepted name is present for
/// the pickup or dropoff timestamp.
pub fn preprocess_with_summary(
    table: &TripTable,
    options: &PreprocessOptions,
) -> Result<(Vec<TripRecord>, PreprocessSummary)> {
    let pickup_column = table
        .resolve_column(PICKUP_COLUMNS)
        .ok_or_else(|| TripError::schema("pickup_datetime", PICKUP_COLUMNS))?;
    let dropoff_column = table
        .resolve_column(DROPOFF_COLUMNS)
        .ok_or_else(|| TripError::schema("dropoff_datetime", DROPOFF_COLUMNS))?;
    let filter_distance = table.has_column(DISTANCE_COLUMN);
    let fare_column = table.resolve_column(FARE_COLUMNS);

    tracing::debug!(
        "Resolved pickup={pickup_column}, dropoff={dropoff_column}, distance filter={filter_distance}, fare column={fare_column:?}"
    );

    let mut summary = PreprocessSummary {
        input_rows: table.len(),
        distance_filter_applied: filter_distance,
        fare_column,
        ..PreprocessSummary::default()
    };
    let mut trips = Vec::new();

    for row in table.rows() {
        let (Some(pickup), Some(dropoff)) = (
            timestamp(row, pickup_column),
            timestamp(row, dropoff_column),
        ) else {
            continue;
        };
        summary.timestamped += 1;

        let trip_duration = duration_minutes(pickup, dropoff);
        if !(options.min_duration..=options.max_duration).contains(&trip_duration) {
            continue;
        }
        summary.after_duration += 1;

        if filter_distance {
            let in_range = numeric(row, DISTANCE_COLUMN)
                .is_some_and(|d| (options.min_distance..=options.max_distance).contains(&d));
            if !in_range {
                continue;
            }
        }
        summary.after_distance += 1;

        if let Some(column) = fare_column {
            if !numeric(row, column).is_some_and(|fare| fare >= options.min_fare) {
                continue;
            }
        }
        summary.after_fare += 1;

        trips.push(build_record(row, pickup, dropoff, trip_duration));
    }

    tracing::debug!(
        "Filter stages: {} input, {} timestamped, {} after duration, {} after distance, {} after fare",
        summary.input_rows,
        summary.timestamped,
        summary.after_duration,
        summary.after_distance,
        summary.after_fare
    );
    tracing::info!(
        "Preprocessing kept {} of {} trips",
        trips.len(),
        summary.input_rows
    );

    Ok((trips, summary))
}

fn timestamp(row: &RawRow, column: &str) -> Option<Timestamp> {
    row.get(column).and_then(RawValue::as_timestamp)
}

fn numeric(row: &RawRow, column: &str) -> Option<f64> {
    row.get(column).and_then(RawValue::as_f64)
}

/// Elapsed minutes; offsets are honoured so a DST change does not skew it
fn duration_minutes(pickup: Timestamp, dropoff: Timestamp) -> f64 {
    (dropoff - pickup).num_milliseconds() as f64 / 60_000.0
}

fn build_record(
    row: &RawRow,
    pickup: Timestamp,
    dropoff: Timestamp,
    trip_duration: f64,
) -> TripRecord {
    // Source timestamp columns are represented by the typed fields
    let columns = row
        .iter()
        .filter(|(name, _)| {
            !DERIVED_FIELDS.contains(&name.as_str())
                && !PICKUP_COLUMNS.contains(&name.as_str())
                && !DROPOFF_COLUMNS.contains(&name.as_str())
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    TripRecord {
        pickup_datetime: pickup,
        dropoff_datetime: dropoff,
        trip_duration,
        pickup_hour: pickup.hour(),
        pickup_day: pickup.day(),
        pickup_month: pickup.month(),
        pickup_dayofweek: pickup.weekday().num_days_from_monday(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(pickup: &str, dropoff: &str, extra: &[(&str, f64)]) -> RawRow {
        let mut row = RawRow::new();
        row.insert("tpep_pickup_datetime".to_string(), RawValue::from(pickup));
        row.insert("tpep_dropoff_datetime".to_string(), RawValue::from(dropoff));
        for (name, value) in extra {
            row.insert((*name).to_string(), RawValue::Number(*value));
        }
        row
    }

    #[test]
    fn test_duration_and_calendar_features() {
        // 2024-01-15 is a Monday
        let table = TripTable::from_rows(vec![trip(
            "2024-01-15 08:30:00",
            "2024-01-15 08:52:30",
            &[("trip_distance", 3.1), ("fare_amount", 14.5)],
        )]);
        let trips = preprocess(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(trips.len(), 1);
        let t = &trips[0];
        assert!((t.trip_duration - 22.5).abs() < 1e-9);
        assert_eq!(t.pickup_hour, 8);
        assert_eq!(t.pickup_day, 15);
        assert_eq!(t.pickup_month, 1);
        assert_eq!(t.pickup_dayofweek, 0);
        assert_eq!(t.column("fare_amount"), Some(14.5));
        assert!(!t.columns.contains_key("tpep_pickup_datetime"));
    }

    #[test]
    fn test_duration_is_elapsed_time_across_offsets() {
        let table = TripTable::from_rows(vec![
            // US fall-back: the wall clock goes backwards during the ride
            trip("2024-11-03T01:50:00-04:00", "2024-11-03T01:05:00-05:00", &[]),
            trip("2024-01-15T08:00:00-05:00", "2024-01-15T13:10:00Z", &[]),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(summary.timestamped, 2);
        assert_eq!(trips.len(), 2);

        assert!((trips[0].trip_duration - 15.0).abs() < 1e-9);
        // 2024-11-03 is a Sunday
        assert_eq!(trips[0].pickup_hour, 1);
        assert_eq!(trips[0].pickup_dayofweek, 6);

        assert!((trips[1].trip_duration - 10.0).abs() < 1e-9);
        assert_eq!(trips[1].pickup_hour, 8);
        assert_eq!(trips[1].pickup_day, 15);
    }

    #[test]
    fn test_alternate_column_names() {
        let mut row = RawRow::new();
        row.insert("pickup_datetime".to_string(), RawValue::from("2024-06-01 23:10:00"));
        row.insert("dropoff_datetime".to_string(), RawValue::from("2024-06-01 23:40:00"));
        let table = TripTable::from_rows(vec![row]);
        let trips = preprocess(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(trips.len(), 1);
        // 2024-06-01 is a Saturday
        assert_eq!(trips[0].pickup_dayofweek, 5);
        assert_eq!(trips[0].pickup_hour, 23);
    }

    #[test]
    fn test_missing_pickup_column_is_schema_error() {
        let mut row = RawRow::new();
        row.insert("dropoff_datetime".to_string(), RawValue::from("2024-06-01 23:40:00"));
        let table = TripTable::from_rows(vec![row]);
        let err = preprocess(&table, &PreprocessOptions::default()).expect_err("no pickup");
        assert!(matches!(
            err,
            TripError::Schema {
                column: "pickup_datetime",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_dropoff_column_is_schema_error() {
        let mut row = RawRow::new();
        row.insert("pickup_datetime".to_string(), RawValue::from("2024-06-01 23:40:00"));
        let table = TripTable::from_rows(vec![row]);
        let err = preprocess(&table, &PreprocessOptions::default()).expect_err("no dropoff");
        assert!(matches!(
            err,
            TripError::Schema {
                column: "dropoff_datetime",
                ..
            }
        ));
    }

    #[test]
    fn test_duration_bounds_are_inclusive() {
        let table = TripTable::from_rows(vec![
            trip("2024-01-15 08:00:00", "2024-01-15 08:01:00", &[]),
            trip("2024-01-15 08:00:00", "2024-01-15 08:00:59", &[]),
            trip("2024-01-15 08:00:00", "2024-01-16 08:00:00", &[]),
            trip("2024-01-15 08:00:00", "2024-01-16 08:00:01", &[]),
            trip("2024-01-15 08:00:00", "2024-01-15 07:50:00", &[]),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(trips.len(), 2);
        assert_eq!(summary.timestamped, 5);
        assert_eq!(summary.after_duration, 2);
        assert!(!summary.distance_filter_applied);
        assert_eq!(summary.fare_column, None);
    }

    #[test]
    fn test_distance_filter_only_when_column_exists() {
        let table = TripTable::from_rows(vec![
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[("trip_distance", 0.05)]),
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[("trip_distance", 2.0)]),
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[("trip_distance", 150.0)]),
            // Column exists in the table, but this row has no value
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[]),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert!(summary.distance_filter_applied);
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].column("trip_distance"), Some(2.0));
    }

    #[test]
    fn test_fare_prefers_fare_amount_over_total() {
        let table = TripTable::from_rows(vec![
            trip(
                "2024-01-15 08:00:00",
                "2024-01-15 08:10:00",
                &[("fare_amount", 1.0), ("total_amount", 50.0)],
            ),
            trip(
                "2024-01-15 08:00:00",
                "2024-01-15 08:10:00",
                &[("fare_amount", 2.5), ("total_amount", 1.0)],
            ),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(summary.fare_column, Some("fare_amount"));
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].column("fare_amount"), Some(2.5));
    }

    #[test]
    fn test_fare_falls_back_to_total_amount() {
        let table = TripTable::from_rows(vec![
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[("total_amount", 2.0)]),
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[("total_amount", 9.0)]),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(summary.fare_column, Some("total_amount"));
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn test_unparseable_timestamp_drops_row() {
        let table = TripTable::from_rows(vec![
            trip("not a time", "2024-01-15 08:10:00", &[]),
            trip("2024-01-15 08:00:00", "2024-01-15 08:10:00", &[]),
        ]);
        let (trips, summary) =
            preprocess_with_summary(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(summary.input_rows, 2);
        assert_eq!(summary.timestamped, 1);
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn test_input_is_not_modified() {
        let table = TripTable::from_rows(vec![trip(
            "2024-01-15 08:00:00",
            "2024-01-15 08:10:00",
            &[],
        )]);
        let before = table.rows().to_vec();
        let _ = preprocess(&table, &PreprocessOptions::default()).expect("valid schema");
        assert_eq!(table.rows(), before.as_slice());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let options = PreprocessOptions {
            min_duration: 10.0,
            max_duration: 5.0,
            ..PreprocessOptions::default()
        };
        assert!(matches!(options.validate(), Err(TripError::Config(_))));
        assert!(PreprocessOptions::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let options = PreprocessOptions {
            min_fare: f64::NAN,
            ..PreprocessOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
