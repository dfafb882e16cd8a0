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

use super::{RawRow, TripTable};
use crate::error::{Result, TripError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a JSON-lines stream into a table.
/// Each non-blank line must be one JSON object; anything else aborts the read.
pub fn read_table<R: BufRead>(reader: R) -> Result<TripTable> {
    let mut table = TripTable::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: RawRow = serde_json::from_str(trimmed).map_err(|e| TripError::Parse {
            line: line_number,
            message: e.to_string(),
        })?;
        table.push_row(row);
    }

    tracing::debug!(
        "Read {} rows with {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Load a JSON-lines file from disk
pub fn load_table(path: &Path) -> Result<TripTable> {
    let start = std::time::Instant::now();
    let file = File::open(path)?;
    let table = read_table(BufReader::new(file))?;
    tracing::info!(
        "Loaded {} trips from {} in {:?}",
        table.len(),
        path.display(),
        start.elapsed()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RawValue;

    #[test]
    fn test_read_table_skips_blank_lines() {
        let input = "{\"trip_distance\": 1.5}\n\n   \n{\"fare_amount\": 7}\n";
        let table = read_table(input.as_bytes()).expect("valid input");
        assert_eq!(table.len(), 2);
        assert!(table.has_column("trip_distance"));
        assert!(table.has_column("fare_amount"));
        assert_eq!(
            table.rows()[1].get("fare_amount"),
            Some(&RawValue::Number(7.0))
        );
    }

    #[test]
    fn test_read_table_reports_line_number() {
        let input = "{\"a\": 1}\n[1, 2, 3]\n";
        let err = read_table(input.as_bytes()).expect_err("array is not a row");
        match err {
            TripError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table(Path::new("/definitely/not/here.jsonl")).expect_err("missing file");
        assert!(matches!(err, TripError::Io(_)));
    }
}
