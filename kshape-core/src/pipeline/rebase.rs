//! Rebasing to 100 at the baseline date.

use crate::outcome::{Outcome, PipelineWarning};
use crate::table::Table;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Rescale every column so its value at the row nearest `baseline` is 100.
///
/// Ties between two equally distant rows go to the earlier one. A column whose
/// baseline value is zero or missing becomes all-missing and is reported as
/// `ZeroBaseline`; it never produces infinities.
pub fn rebase(table: &Table, baseline: NaiveDate) -> Outcome<Table> {
    let Some(row) = table.nearest_row(baseline) else {
        warn!("rebase: empty input table");
        return Outcome::Degraded {
            value: table.clone(),
            warnings: vec![PipelineWarning::EmptyTable { stage: "rebase" }],
        };
    };
    let baseline_row = table.dates()[row];
    debug!(%baseline, %baseline_row, "rebasing");

    let mut warnings = Vec::new();
    let mut rebased = table.clone();
    for (name, values) in table.columns() {
        let base = values[row];
        let column = if base.is_finite() && base != 0.0 {
            values.iter().map(|v| v / base * 100.0).collect()
        } else {
            warn!(column = name, %baseline_row, "zero or missing baseline value");
            warnings.push(PipelineWarning::ZeroBaseline {
                column: name.to_string(),
                baseline_row,
            });
            vec![f64::NAN; values.len()]
        };
        rebased.set_column(name, column);
    }

    Outcome::from_parts(rebased, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn monthly(values: Vec<f64>) -> Table {
        Table::from_columns(
            vec![d("2019-12-31"), d("2020-01-31"), d("2020-02-29")],
            vec![("A".into(), values)],
        )
        .unwrap()
    }

    #[test]
    fn nearest_row_is_exactly_100() {
        let outcome = rebase(&monthly(vec![50.0, 80.0, 120.0]), d("2020-01-01"));
        assert!(!outcome.is_degraded());
        let a = outcome.value().column("A").unwrap();
        assert!((a[0] - 100.0).abs() < 1e-9);
        assert!((a[1] - 160.0).abs() < 1e-9);
        assert!((a[2] - 240.0).abs() < 1e-9);
    }

    #[test]
    fn tie_resolves_to_earlier_row() {
        let table = Table::from_columns(
            vec![d("2020-01-01"), d("2020-01-03")],
            vec![("A".into(), vec![4.0, 8.0])],
        )
        .unwrap();
        let a = rebase(&table, d("2020-01-02")).into_value();
        assert_eq!(a.column("A").unwrap(), &[100.0, 200.0]);
    }

    #[test]
    fn zero_baseline_becomes_missing_not_infinite() {
        let outcome = rebase(&monthly(vec![0.0, 1.0, 2.0]), d("2019-12-31"));
        assert!(outcome.is_degraded());
        assert!(outcome.value().column("A").unwrap().iter().all(|v| v.is_nan()));
        assert!(matches!(
            &outcome.warnings()[0],
            PipelineWarning::ZeroBaseline { column, .. } if column == "A"
        ));
    }

    #[test]
    fn missing_baseline_becomes_missing() {
        let outcome = rebase(&monthly(vec![f64::NAN, 1.0, 2.0]), d("2019-12-31"));
        assert!(outcome.value().column("A").unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn empty_table_passes_through() {
        let outcome = rebase(&Table::default(), d("2020-01-01"));
        assert!(matches!(
            outcome.warnings(),
            [PipelineWarning::EmptyTable { stage: "rebase" }]
        ));
    }
}
