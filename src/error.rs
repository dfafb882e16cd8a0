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

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, TripError>;

/// Errors raised by preprocessing, detection and loading
#[derive(Error, Debug)]
pub enum TripError {
    /// None of the accepted column names for a required column is present
    #[error("missing required column: {column} (tried {candidates})")]
    Schema {
        column: &'static str,
        candidates: String,
    },

    /// A statistical detector was called with zero elements
    #[error("cannot compute statistics over an empty sequence")]
    EmptyInput,

    /// Every value in the input is identical, so the standard deviation is zero
    #[error("input has zero variance")]
    DegenerateInput,

    /// A scaler or classifier broke its input/output contract
    #[error("model error: {0}")]
    Model(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TripError {
    pub(crate) fn schema(column: &'static str, candidates: &[&str]) -> Self {
        Self::Schema {
            column,
            candidates: candidates.join(", "),
        }
    }
}
