//! Outer-join of all configured series into one wide table.

use crate::config::{PipelineConfig, ScheduleStep};
use crate::data::{SeriesCache, SeriesKey, SeriesProvider};
use crate::outcome::{Outcome, PipelineWarning};
use crate::table::Table;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Name of the synthesized tariff step column.
pub const TARIFF_COLUMN: &str = "TARIFF_RATE";

/// Fetch every configured series through `cache` and join them on date.
///
/// Observations before `config.start_date` are dropped. The joined table is
/// sorted, forward-filled per column and gets a `TARIFF_RATE` step column. A
/// series that fails to load becomes an all-missing column and a
/// `FetchFailed` warning. A fully successful merge is memoized in the cache's
/// dataset slot and returned from there on later calls.
pub fn merge_series(
    provider: &dyn SeriesProvider,
    cache: &mut SeriesCache,
    config: &PipelineConfig,
) -> Outcome<Table> {
    if let Some(merged) = cache.merged() {
        debug!("merged dataset served from cache");
        return merged.clone();
    }

    let mut warnings = Vec::new();
    let mut fetched: Vec<(&str, BTreeMap<NaiveDate, f64>)> = Vec::with_capacity(config.series.len());

    for spec in &config.series {
        let key = SeriesKey::new(&spec.series_id, &spec.name);
        let values = match cache.get_or_fetch(provider, &key) {
            Ok(observations) => observations
                .iter()
                .filter(|o| o.date >= config.start_date)
                .map(|o| (o.date, o.value))
                .collect(),
            Err(e) => {
                warn!(column = %spec.name, series_id = %spec.series_id, error = %e, "series failed to load");
                warnings.push(PipelineWarning::FetchFailed {
                    column: spec.name.clone(),
                    series_id: spec.series_id.clone(),
                    source: e,
                });
                BTreeMap::new()
            }
        };
        fetched.push((spec.name.as_str(), values));
    }

    let index: Vec<NaiveDate> = fetched
        .iter()
        .flat_map(|(_, values)| values.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // BTreeSet order is strictly ascending, so the index is always accepted.
    let mut table = Table::with_index(index).unwrap_or_default();
    for (name, values) in fetched {
        let column = table
            .dates()
            .iter()
            .map(|date| values.get(date).copied().unwrap_or(f64::NAN))
            .collect();
        table.set_column(name, column);
    }
    table.forward_fill();

    let tariff = tariff_column(table.dates(), &config.tariff_schedule);
    table.set_column(TARIFF_COLUMN, tariff);

    info!(
        rows = table.height(),
        columns = table.width(),
        failed = warnings.len(),
        "merged series"
    );

    let outcome = Outcome::from_parts(table, warnings);
    if !outcome.is_degraded() {
        cache.set_merged(outcome.clone());
    }
    outcome
}

/// Step-function values of `schedule` at each of `dates`.
///
/// A date takes the value of the latest step effective on or before it.
/// Dates before the first step take the first step's value; an empty
/// schedule yields zeros.
pub fn tariff_column(dates: &[NaiveDate], schedule: &[ScheduleStep]) -> Vec<f64> {
    let Some(first) = schedule.first() else {
        return vec![0.0; dates.len()];
    };
    dates
        .iter()
        .map(|date| {
            let applied = schedule.partition_point(|step| step.effective <= *date);
            if applied == 0 {
                first.value
            } else {
                schedule[applied - 1].value
            }
        })
        .collect()
}
