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

use crate::parser::{RawRow, RawValue, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Numeric view of a trip: field name to value. Absent fields are simply missing.
pub type TripFields = BTreeMap<String, f64>;

/// Names the preprocessor derives itself; input columns with these names are replaced
pub const DERIVED_FIELDS: &[&str] = &[
    "pickup_datetime",
    "dropoff_datetime",
    "trip_duration",
    "pickup_hour",
    "pickup_day",
    "pickup_month",
    "pickup_dayofweek",
];

/// A cleaned trip with its derived temporal features.
///
/// Every input column the preprocessor does not derive itself is carried
/// through in `columns`, so distance, fare and passenger data stay available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub pickup_datetime: Timestamp,
    pub dropoff_datetime: Timestamp,
    /// Minutes between pickup and dropoff
    pub trip_duration: f64,
    /// 0-23, in the pickup's own offset
    pub pickup_hour: u32,
    /// Day of month, 1-31
    pub pickup_day: u32,
    /// 1-12
    pub pickup_month: u32,
    /// 0 = Monday
    pub pickup_dayofweek: u32,
    #[serde(flatten)]
    pub columns: RawRow,
}

impl TripRecord {
    /// Numeric value of a derived feature or carried-through column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<f64> {
        match name {
            "trip_duration" => Some(self.trip_duration),
            "pickup_hour" => Some(f64::from(self.pickup_hour)),
            "pickup_day" => Some(f64::from(self.pickup_day)),
            "pickup_month" => Some(f64::from(self.pickup_month)),
            "pickup_dayofweek" => Some(f64::from(self.pickup_dayofweek)),
            _ => self.columns.get(name).and_then(RawValue::as_f64),
        }
    }

    /// All numeric fields of this trip, derived features included
    #[must_use]
    pub fn fields(&self) -> TripFields {
        let mut fields: TripFields = self
            .columns
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name.clone(), v)))
            .collect();

        fields.insert("trip_duration".to_string(), self.trip_duration);
        fields.insert("pickup_hour".to_string(), f64::from(self.pickup_hour));
        fields.insert("pickup_day".to_string(), f64::from(self.pickup_day));
        fields.insert("pickup_month".to_string(), f64::from(self.pickup_month));
        fields.insert(
            "pickup_dayofweek".to_string(),
            f64::from(self.pickup_dayofweek),
        );
        fields
    }
}
