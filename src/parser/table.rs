use super::RawValue;
use indexmap::{IndexMap, IndexSet};

/// One raw input row, columns in the order they appeared in the source
pub type RawRow = IndexMap<String, RawValue>;

/// An in-memory table of raw trip rows.
///
/// The column set is the union of keys over every row, in first-seen order.
/// A column "exists" if any row carries it; rows that lack it simply have no
/// value there.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    columns: IndexSet<String>,
    rows: Vec<RawRow>,
}

impl TripTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, row: RawRow) {
        for key in row.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.clone());
            }
        }
        self.rows.push(row);
    }

    #[must_use]
    pub const fn columns(&self) -> &IndexSet<String> {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Pick the first candidate column present in the table
    #[must_use]
    pub fn resolve_column(&self, candidates: &[&'static str]) -> Option<&'static str> {
        candidates.iter().copied().find(|c| self.has_column(c))
    }
}

impl FromIterator<RawRow> for TripTable {
    fn from_iter<I: IntoIterator<Item = RawRow>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.push_row(row);
        }
        table
    }
}
