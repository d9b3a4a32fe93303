//! Month-end resampling.

use crate::outcome::{Outcome, PipelineWarning};
use crate::table::Table;
use chrono::{Datelike, NaiveDate};
use tracing::warn;

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn month_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Resample `table` to one row per calendar month, dated at month-end.
///
/// Rows run from the first row's month to the last row's month with no gaps.
/// Each cell is the column's last non-missing value in that month, then every
/// column is forward-filled. Aligning an aligned table returns it unchanged.
pub fn align_to_monthly(table: &Table) -> Outcome<Table> {
    let (Some(first), Some(last)) = (table.first_date(), table.last_date()) else {
        warn!("align: empty input table");
        return Outcome::Degraded {
            value: table.clone(),
            warnings: vec![PipelineWarning::EmptyTable { stage: "align" }],
        };
    };

    let origin = month_ordinal(first);
    let months = (month_ordinal(last) - origin + 1) as usize;

    let mut index = Vec::with_capacity(months);
    let mut cursor = month_end(first);
    for _ in 0..months {
        index.push(cursor);
        cursor = cursor
            .succ_opt()
            .map(month_end)
            .unwrap_or(NaiveDate::MAX);
    }

    let slots: Vec<usize> = table
        .dates()
        .iter()
        .map(|date| (month_ordinal(*date) - origin) as usize)
        .collect();

    let mut aligned = Table::with_index(index).unwrap_or_default();
    for (name, values) in table.columns() {
        let mut monthly = vec![f64::NAN; months];
        for (slot, value) in slots.iter().zip(values) {
            if !value.is_nan() {
                monthly[*slot] = *value;
            }
        }
        aligned.set_column(name, monthly);
    }
    aligned.forward_fill();

    Outcome::Complete(aligned)
}
