pub mod explainer;
pub mod features;
pub mod models;
pub mod scorer;
pub mod statistical;

pub use explainer::{
    detect, detect_batch, detect_with_thresholds, explain, AnomalyResult, AnomalyType,
    ExplanationThresholds,
};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
pub use models::{StandardScaler, ZScoreClassifier};
pub use scorer::{FeatureScaler, PointClassifier, ANOMALY_LABEL, NORMAL_LABEL};
pub use statistical::{iqr_anomalies, iqr_bounds, zscore_anomalies, zscore_scores, OutlierBounds};

use crate::core::TripRecord;
use crate::error::Result;

/// Fit the reference point-anomaly pipeline on a set of trips
pub fn create_default_models(
    trips: &[TripRecord],
    threshold: f64,
) -> Result<(StandardScaler, ZScoreClassifier)> {
    let features: Vec<FeatureVector> = trips
        .iter()
        .map(|trip| FeatureVector::from_fields(&trip.fields()))
        .collect();
    let scaler = StandardScaler::fit(&features)?;
    let classifier = ZScoreClassifier::new(threshold)?;
    Ok((scaler, classifier))
}

/// Fit the reference models on `trips` and classify every one of them.
///
/// No trips means nothing to fit or score, so the result is simply empty.
pub fn detect_trips(
    trips: &[TripRecord],
    classifier_threshold: f64,
    thresholds: &ExplanationThresholds,
) -> Result<Vec<AnomalyResult>> {
    if trips.is_empty() {
        tracing::info!("No trips left after filtering, skipping detection");
        return Ok(Vec::new());
    }

    let (scaler, classifier) = create_default_models(trips, classifier_threshold)?;
    let fields: Vec<_> = trips.iter().map(TripRecord::fields).collect();
    detect_batch(&fields, &classifier, &scaler, thresholds)
}
