//! The K-shape pipeline: merge, align, derive, rebase, composite.
//!
//! Every stage returns an `Outcome`; the driver collects the warnings of all
//! stages and always produces a table.

pub mod align;
pub mod composite;
pub mod derive;
pub mod merge;
pub mod rebase;

pub use align::{align_to_monthly, month_end};
pub use composite::{build_composites, K_LOWER, K_LOWER_NOMINAL_WAGE, K_UPPER};
pub use derive::{add_derived, add_raw_passthrough, RAW_SUFFIX};
pub use merge::{merge_series, tariff_column, TARIFF_COLUMN};
pub use rebase::rebase;

use crate::config::PipelineConfig;
use crate::data::{SeriesCache, SeriesProvider};
use crate::outcome::Outcome;
use crate::table::Table;
use chrono::NaiveDate;
use tracing::info;

/// Final monthly table and the row the baseline resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub table: Table,
    /// `None` only when there was no data at all.
    pub baseline_row: Option<NaiveDate>,
}

/// Run every stage against `provider`, memoizing fetches in `cache`.
pub fn run_pipeline(
    provider: &dyn SeriesProvider,
    cache: &mut SeriesCache,
    config: &PipelineConfig,
) -> Outcome<PipelineOutput> {
    let mut warnings = Vec::new();

    let merged = merge_series(provider, cache, config).collect_into(&mut warnings);
    let mut raw = align_to_monthly(&merged).collect_into(&mut warnings);
    add_derived(&mut raw);

    let baseline_row = raw
        .nearest_row(config.baseline_date)
        .map(|row| raw.dates()[row]);

    let mut indexed = rebase(&raw, config.baseline_date).collect_into(&mut warnings);
    add_raw_passthrough(&mut indexed, &raw);

    let table = build_composites(&indexed, config.baseline_date).collect_into(&mut warnings);

    info!(
        provider = provider.name(),
        rows = table.height(),
        columns = table.width(),
        baseline_row = ?baseline_row,
        warnings = warnings.len(),
        "pipeline finished"
    );

    Outcome::from_parts(PipelineOutput { table, baseline_row }, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScheduleStep, SeriesSpec};
    use crate::data::{MemoryProvider, Observation};
    use crate::outcome::PipelineWarning;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            start_date: d("2019-12-01"),
            baseline_date: d("2020-01-01"),
            http_timeout_secs: 60,
            series: vec![
                SeriesSpec::new("SP500", "SP500", "S&P 500 Index"),
                SeriesSpec::new("UNRATE", "UNRATE", "Unemployment Rate (%)"),
            ],
            tariff_schedule: vec![ScheduleStep { effective: d("2019-01-01"), value: 25.0 }],
        }
    }

    #[test]
    fn produces_indexed_raw_and_composite_columns() {
        let provider = MemoryProvider::new()
            .with_series(
                "SP500",
                vec![
                    Observation::new(d("2019-12-31"), 3230.0),
                    Observation::new(d("2020-01-31"), 3225.0),
                    Observation::new(d("2020-02-28"), 2954.0),
                ],
            )
            .with_series(
                "UNRATE",
                vec![
                    Observation::new(d("2019-12-01"), 3.6),
                    Observation::new(d("2020-01-01"), 3.5),
                ],
            );
        let mut cache = SeriesCache::new();

        let outcome = run_pipeline(&provider, &mut cache, &config());
        let output = outcome.value();
        let table = &output.table;

        assert_eq!(table.height(), 3);
        assert_eq!(output.baseline_row, Some(d("2019-12-31")));
        assert_eq!(table.column("SP500").unwrap()[0], 100.0);
        assert_eq!(table.column("SP500_RAW").unwrap()[2], 2954.0);
        assert_eq!(table.column("UNRATE").unwrap()[2], 3.5 / 3.6 * 100.0);
        assert_eq!(table.column("TARIFF_RATE_RAW").unwrap(), &[25.0, 25.0, 25.0]);
        assert!(table.has_column(K_UPPER));
        assert!(table.has_column(K_LOWER));
        assert!(table.has_column(K_LOWER_NOMINAL_WAGE));

        // Upper composite falls back to equities alone.
        let k_upper = table.column(K_UPPER).unwrap();
        assert!((k_upper[2] - 2954.0 / 3230.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_data_still_returns_a_table() {
        let provider = MemoryProvider::new().with_failure("SP500").with_failure("UNRATE");
        let mut cache = SeriesCache::new();

        let outcome = run_pipeline(&provider, &mut cache, &config());
        assert!(outcome.is_degraded());
        assert!(outcome.value().table.is_empty());
        assert_eq!(outcome.value().baseline_row, None);

        let failed = outcome
            .warnings()
            .iter()
            .filter(|w| matches!(w, PipelineWarning::FetchFailed { .. }))
            .count();
        assert_eq!(failed, 2);
    }
}
