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
use crate::error::Result;

/// Label a [`PointClassifier`] returns for an anomalous row
pub const ANOMALY_LABEL: i32 = -1;
/// Label a [`PointClassifier`] returns for a normal row
pub const NORMAL_LABEL: i32 = 1;

/// Normalizes feature rows before classification.
///
/// Implementations must return exactly one output row per input row, in order.
pub trait FeatureScaler {
    fn transform(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>>;
}

/// A trained point-anomaly model, typically an Isolation Forest.
///
/// Returns one label per input row: [`ANOMALY_LABEL`] or [`NORMAL_LABEL`].
pub trait PointClassifier {
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<i32>>;
}
