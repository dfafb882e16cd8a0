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

use crate::anomaly::explainer::ExplanationThresholds;
use crate::anomaly::statistical::{DEFAULT_IQR_MULTIPLIER, DEFAULT_ZSCORE_THRESHOLD};
use crate::core::PreprocessOptions;
use crate::error::{Result, TripError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Analysis settings stored in the user's config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Bounds for discarding implausible trips
    #[serde(default)]
    pub filters: PreprocessOptions,

    /// When a flagged trip gets a human-readable explanation
    #[serde(default)]
    pub thresholds: ExplanationThresholds,

    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,

    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,

    /// Standardized distance at which the reference classifier flags a trip
    #[serde(default = "default_classifier_threshold")]
    pub classifier_threshold: f64,
}

const fn default_zscore_threshold() -> f64 {
    DEFAULT_ZSCORE_THRESHOLD
}

const fn default_iqr_multiplier() -> f64 {
    DEFAULT_IQR_MULTIPLIER
}

const fn default_classifier_threshold() -> f64 {
    3.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filters: PreprocessOptions::default(),
            thresholds: ExplanationThresholds::default(),
            zscore_threshold: default_zscore_threshold(),
            iqr_multiplier: default_iqr_multiplier(),
            classifier_threshold: default_classifier_threshold(),
        }
    }
}

impl AnalysisConfig {
    /// Get the path to the global config file
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripcrab").join("config.json"))
    }

    /// Load the global config, returning defaults if it is missing or broken
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::info!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("No global config found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| TripError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TripError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, json)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.filters.validate()?;
        for (name, value) in [
            ("zscore_threshold", self.zscore_threshold),
            ("iqr_multiplier", self.iqr_multiplier),
            ("classifier_threshold", self.classifier_threshold),
            ("thresholds.duration_minutes", self.thresholds.duration_minutes),
            ("thresholds.distance_miles", self.thresholds.distance_miles),
            ("thresholds.fare", self.thresholds.fare),
        ] {
            if !value.is_finite() {
                return Err(TripError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        Ok(())
    }
}
