//! Derived raw-unit series and `_RAW` passthrough columns.

use crate::table::Table;
use tracing::debug;

/// Suffix of a column that keeps a series in its original units.
pub const RAW_SUFFIX: &str = "_RAW";

pub const REAL_WAGE: &str = "REAL_WAGE_LOW_WAGE";
pub const UPPER_WEALTH: &str = "WEALTH_TOP50";

const NOMINAL_WAGE: &str = "WAGE_LOW_WAGE";
const CPI: &str = "CPIAUCSL";
const UPPER_WEALTH_PARTS: [&str; 4] = [
    "WEALTH_TOP0_1",
    "WEALTH_99_999",
    "WEALTH_NEXT9",
    "WEALTH_NEXT40",
];

pub fn raw_name(column: &str) -> String {
    format!("{column}{RAW_SUFFIX}")
}

/// `REAL_WAGE_LOW_WAGE = WAGE_LOW_WAGE / CPIAUCSL * 100`, when both exist.
///
/// Returns whether the column was added.
pub fn add_real_wage(table: &mut Table) -> bool {
    let (Some(wage), Some(cpi)) = (table.column(NOMINAL_WAGE), table.column(CPI)) else {
        debug!("real wage skipped: wage or CPI column absent");
        return false;
    };
    let real = wage.iter().zip(cpi).map(|(w, c)| w / c * 100.0).collect();
    table.set_column(REAL_WAGE, real);
    true
}

/// `WEALTH_TOP50` as the sum of the four top-half wealth shares, when all exist.
///
/// A missing operand makes that row missing. Returns whether the column was added.
pub fn add_upper_wealth(table: &mut Table) -> bool {
    let parts: Option<Vec<&[f64]>> = UPPER_WEALTH_PARTS
        .iter()
        .map(|name| table.column(name))
        .collect();
    let Some(parts) = parts else {
        debug!("upper wealth skipped: a wealth share column is absent");
        return false;
    };
    let sum = (0..table.height())
        .map(|row| parts.iter().map(|column| column[row]).sum::<f64>())
        .collect();
    table.set_column(UPPER_WEALTH, sum);
    true
}

/// Add every derived raw-unit column the table has inputs for.
pub fn add_derived(table: &mut Table) {
    add_real_wage(table);
    add_upper_wealth(table);
}

/// Copy every column of `raw` into `rebased` as `<NAME>_RAW`.
pub fn add_raw_passthrough(rebased: &mut Table, raw: &Table) {
    for (name, values) in raw.columns() {
        rebased.set_column(raw_name(name), values.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(columns: &[(&str, Vec<f64>)]) -> Table {
        let dates = (1..=columns[0].1.len() as u32)
            .map(|m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap())
            .collect();
        Table::from_columns(
            dates,
            columns.iter().map(|(n, v)| (n.to_string(), v.clone())).collect(),
        )
        .unwrap()
    }

    #[test]
    fn real_wage_deflates_by_cpi() {
        let mut t = table(&[
            ("WAGE_LOW_WAGE", vec![16.0, 17.0]),
            ("CPIAUCSL", vec![200.0, 250.0]),
        ]);
        assert!(add_real_wage(&mut t));
        let real = t.column(REAL_WAGE).unwrap();
        assert!((real[0] - 8.0).abs() < 1e-12);
        assert!((real[1] - 6.8).abs() < 1e-12);
    }

    #[test]
    fn real_wage_needs_both_inputs() {
        let mut t = table(&[("WAGE_LOW_WAGE", vec![16.0])]);
        assert!(!add_real_wage(&mut t));
        assert!(!t.has_column(REAL_WAGE));
    }

    #[test]
    fn upper_wealth_sums_four_shares() {
        let mut t = table(&[
            ("WEALTH_TOP0_1", vec![13.0, f64::NAN]),
            ("WEALTH_99_999", vec![17.0, 17.0]),
            ("WEALTH_NEXT9", vec![37.0, 37.0]),
            ("WEALTH_NEXT40", vec![30.5, 30.5]),
        ]);
        assert!(add_upper_wealth(&mut t));
        let top = t.column(UPPER_WEALTH).unwrap();
        assert_eq!(top[0], 97.5);
        assert!(top[1].is_nan());
    }

    #[test]
    fn upper_wealth_needs_all_shares() {
        let mut t = table(&[("WEALTH_TOP0_1", vec![13.0]), ("WEALTH_NEXT9", vec![37.0])]);
        assert!(!add_upper_wealth(&mut t));
    }

    #[test]
    fn passthrough_appends_raw_columns() {
        let raw = table(&[("SP500", vec![3000.0, 3300.0])]);
        let mut rebased = table(&[("SP500", vec![100.0, 110.0])]);
        add_raw_passthrough(&mut rebased, &raw);
        assert_eq!(rebased.column("SP500_RAW").unwrap(), &[3000.0, 3300.0]);
        assert_eq!(rebased.column("SP500").unwrap(), &[100.0, 110.0]);
    }
}
