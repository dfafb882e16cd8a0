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

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tripcrab::anomaly::detect_trips;
use tripcrab::config::AnalysisConfig;
use tripcrab::core::{preprocess_with_summary, TripRecord};
use tripcrab::parser::jsonl::load_table;
use tripcrab::report;

#[derive(Parser, Debug)]
#[command(name = "tripcrab")]
#[command(version)]
#[command(about = "Flag anomalous taxi trips with statistical outlier detection", long_about = None)]
struct Cli {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean trips and print them as JSON lines
    Preprocess {
        /// JSON-lines trip file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print Z-score and IQR outliers for numeric columns
    Outliers {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column to scan, repeatable
        #[arg(long = "column", short = 'c', required = true)]
        columns: Vec<String>,

        /// Z-score threshold
        #[arg(long)]
        zscore_threshold: Option<f64>,

        /// IQR multiplier
        #[arg(long)]
        iqr_multiplier: Option<f64>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Score every trip with the reference point-anomaly model and print the flagged ones
    Detect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Standardized distance at which a trip is flagged
        #[arg(long)]
        threshold: Option<f64>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Overrides for the preprocessing bounds
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Minimum trip duration in minutes
    #[arg(long)]
    min_duration: Option<f64>,
    /// Maximum trip duration in minutes
    #[arg(long)]
    max_duration: Option<f64>,
    /// Minimum trip distance in miles
    #[arg(long)]
    min_distance: Option<f64>,
    /// Maximum trip distance in miles
    #[arg(long)]
    max_distance: Option<f64>,
    /// Minimum fare
    #[arg(long)]
    min_fare: Option<f64>,
}

impl FilterArgs {
    fn apply(&self, config: &mut AnalysisConfig) {
        let filters = &mut config.filters;
        if let Some(v) = self.min_duration {
            filters.min_duration = v;
        }
        if let Some(v) = self.max_duration {
            filters.max_duration = v;
        }
        if let Some(v) = self.min_distance {
            filters.min_distance = v;
        }
        if let Some(v) = self.max_distance {
            filters.max_distance = v;
        }
        if let Some(v) = self.min_fare {
            filters.min_fare = v;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g., RUST_LOG=debug); logs go to stderr so stdout stays JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("TripCrab starting up (version {})", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Preprocess { file, filters } => {
            filters.apply(&mut config);
            let trips = load_trips(&file, &config)?;
            for trip in &trips {
                serde_json::to_writer(&mut out, trip)?;
                writeln!(out)?;
            }
        }
        Command::Outliers {
            file,
            columns,
            zscore_threshold,
            iqr_multiplier,
            filters,
        } => {
            filters.apply(&mut config);
            if let Some(t) = zscore_threshold {
                config.zscore_threshold = t;
            }
            if let Some(m) = iqr_multiplier {
                config.iqr_multiplier = m;
            }
            let trips = load_trips(&file, &config)?;
            let reports = report::scan(&trips, &columns, &config)
                .with_context(|| format!("Failed to scan columns {columns:?}"))?;
            for column_report in &reports {
                serde_json::to_writer(&mut out, column_report)?;
                writeln!(out)?;
            }
        }
        Command::Detect {
            file,
            threshold,
            filters,
        } => {
            filters.apply(&mut config);
            if let Some(t) = threshold {
                config.classifier_threshold = t;
            }
            let trips = load_trips(&file, &config)?;
            let results =
                detect_trips(&trips, config.classifier_threshold, &config.thresholds)
                    .context("Failed to score trips with the reference model")?;

            let mut flagged = 0usize;
            for (index, result) in results.iter().enumerate().filter(|(_, r)| r.is_anomaly) {
                flagged += 1;
                let line = serde_json::json!({ "index": index, "result": result });
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
            }
            tracing::info!("Flagged {flagged} of {} trips", trips.len());
        }
    }

    Ok(())
}

fn load_trips(file: &Path, config: &AnalysisConfig) -> anyhow::Result<Vec<TripRecord>> {
    config.validate().context("Invalid filter settings")?;
    let table =
        load_table(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let (trips, summary) = preprocess_with_summary(&table, &config.filters)
        .with_context(|| format!("Failed to preprocess {}", file.display()))?;
    tracing::info!(
        "{} of {} rows survived (duration {}, distance {}, fare {})",
        trips.len(),
        summary.input_rows,
        summary.after_duration,
        summary.after_distance,
        summary.after_fare
    );
    Ok(trips)
}
