//! Date-indexed wide table of `f64` columns.
//!
//! The index is strictly ascending. Every column has exactly one value per
//! index date and missing values are `NaN`, so ordinary arithmetic propagates
//! them. Column order is insertion order; replacing a column keeps its slot.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {actual} values, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("index is not strictly ascending at position {position}")]
    UnsortedIndex { position: usize },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Table {
    /// An empty table over the given (strictly ascending) index.
    pub fn with_index(dates: Vec<NaiveDate>) -> Result<Self, TableError> {
        if let Some(position) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::UnsortedIndex { position: position + 1 });
        }
        Ok(Self {
            dates,
            columns: Vec::new(),
        })
    }

    /// Build a table from an index and named columns.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        let mut table = Self::with_index(dates)?;
        for (name, values) in columns {
            if table.has_column(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            if values.len() != table.height() {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected: table.height(),
                    actual: values.len(),
                });
            }
            table.columns.push((name, values));
        }
        Ok(table)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Insert or replace a column.
    ///
    /// # Panics
    /// If `values` does not have one entry per index date.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        assert_eq!(
            values.len(),
            self.height(),
            "column '{name}' length does not match table height"
        );
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Forward-fill every column independently.
    pub fn forward_fill(&mut self) {
        for (_, values) in &mut self.columns {
            forward_fill(values);
        }
    }

    /// Row whose date is nearest to `target` by absolute day distance.
    ///
    /// Ties go to the earlier date. `None` only for an empty table.
    pub fn nearest_row(&self, target: NaiveDate) -> Option<usize> {
        if self.dates.is_empty() {
            return None;
        }
        let idx = self.dates.partition_point(|d| *d < target);
        if idx == 0 {
            return Some(0);
        }
        if idx == self.dates.len() {
            return Some(idx - 1);
        }
        let before = (target - self.dates[idx - 1]).num_days();
        let after = (self.dates[idx] - target).num_days();
        Some(if before <= after { idx - 1 } else { idx })
    }

    /// Values of one row, in column order.
    pub fn row(&self, idx: usize) -> Vec<(&str, f64)> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values[idx]))
            .collect()
    }
}

/// Tables compare equal when indices, column names and values match, with
/// missing (`NaN`) equal to missing.
impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.dates == other.dates
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|((na, va), (nb, vb))| {
                    na == nb
                        && va.len() == vb.len()
                        && va
                            .iter()
                            .zip(vb)
                            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
                })
    }
}

/// Replace each `NaN` with the most recent non-missing value before it.
/// Leading `NaN`s stay missing.
pub fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}

/// Index of the first non-missing value.
pub fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// True when every value is missing (including the empty column).
pub fn all_missing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Table {
        Table::from_columns(
            vec![d("2020-01-31"), d("2020-02-29"), d("2020-03-31")],
            vec![("A".into(), vec![1.0, f64::NAN, 3.0])],
        )
        .unwrap()
    }

    #[test]
    fn rejects_unsorted_index() {
        let result = Table::with_index(vec![d("2020-02-01"), d("2020-01-01")]);
        assert_eq!(result.unwrap_err(), TableError::UnsortedIndex { position: 1 });
    }

    #[test]
    fn rejects_duplicate_dates() {
        assert!(Table::with_index(vec![d("2020-01-01"), d("2020-01-01")]).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = Table::from_columns(vec![d("2020-01-01")], vec![("A".into(), vec![1.0, 2.0])]);
        assert!(matches!(result, Err(TableError::LengthMismatch { .. })));
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut t = sample();
        t.set_column("B", vec![0.0; 3]);
        t.set_column("A", vec![9.0; 3]);
        let names: Vec<&str> = t.column_names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(t.column("A").unwrap(), &[9.0, 9.0, 9.0]);
    }

    #[test]
    fn forward_fill_keeps_leading_gaps() {
        let mut values = vec![f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0, f64::NAN];
        forward_fill(&mut values);
        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[1.0, 1.0, 1.0, 4.0, 4.0]);
    }

    #[test]
    fn nearest_row_exact_and_between() {
        let t = sample();
        assert_eq!(t.nearest_row(d("2020-02-29")), Some(1));
        assert_eq!(t.nearest_row(d("2020-01-01")), Some(0));
        assert_eq!(t.nearest_row(d("2021-01-01")), Some(2));
        assert_eq!(t.nearest_row(d("2020-03-30")), Some(2));
    }

    #[test]
    fn nearest_row_tie_goes_to_earlier_date() {
        let t = Table::with_index(vec![d("2020-01-01"), d("2020-01-03")]).unwrap();
        assert_eq!(t.nearest_row(d("2020-01-02")), Some(0));
    }

    #[test]
    fn nearest_row_empty_table() {
        assert_eq!(Table::default().nearest_row(d("2020-01-01")), None);
    }

    #[test]
    fn equality_treats_missing_as_equal() {
        assert_eq!(sample(), sample());
        let mut other = sample();
        other.set_column("A", vec![1.0, 2.0, 3.0]);
        assert_ne!(sample(), other);
    }
}
