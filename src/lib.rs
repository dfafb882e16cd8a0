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

//! `TripCrab` - statistical anomaly scoring for taxi trips
//!
//! - [`core`] cleans raw trips and derives temporal features
//! - [`anomaly`] scores trips with a point-anomaly classifier and explains the verdict,
//!   and flags outliers in numeric columns with Z-score and IQR rules
//! - [`report`] summarizes outliers per column
//! - [`parser`] holds raw values, tables and JSON-lines loading

pub mod anomaly;
pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod report;

pub use error::{Result, TripError};
