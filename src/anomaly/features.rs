//! Feature layout shared by the scaler, the classifier and the explainer.
//!
//! The order below is the input shape every model is trained against.
//! Changing it silently invalidates fitted scalers.

use crate::core::TripFields;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 6;

/// Feature names in the exact order they appear in a [`FeatureVector`]
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "trip_duration",    // 0: minutes
    "pickup_hour",      // 1: 0-23
    "pickup_dayofweek", // 2: 0 = Monday
    "trip_distance",    // 3: miles
    "fare_amount",      // 4: currency units
    "passenger_count",  // 5
];

/// Fixed-order numeric input for the point-anomaly models
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    #[must_use]
    pub const fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from trip fields; any feature missing from `fields` becomes 0
    #[must_use]
    pub fn from_fields(fields: &TripFields) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_LAYOUT) {
            *slot = fields.get(name).copied().unwrap_or(0.0);
        }
        Self { values }
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Pairs of (feature name, value) in layout order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let mut fields = TripFields::new();
        fields.insert("trip_duration".to_string(), 90.0);
        fields.insert("fare_amount".to_string(), 20.0);
        fields.insert("tip_amount".to_string(), 5.0);

        let vector = FeatureVector::from_fields(&fields);
        assert_eq!(vector.values(), &[90.0, 0.0, 0.0, 0.0, 20.0, 0.0]);
    }

    #[test]
    fn test_named_follows_layout() {
        let vector = FeatureVector::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let names: Vec<&str> = vector.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_LAYOUT.to_vec());
        assert_eq!(vector.named().nth(3), Some(("trip_distance", 4.0)));
    }
}
