//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Rebase identity: every column with a usable baseline is 100 at the baseline row
//! 2. Zero-baseline guard: rebasing never produces infinities
//! 3. Alignment idempotence
//! 4. Forward-fill coverage: once a column has a value, it never goes missing again
//! 5. Delinquency neutrality: constant delinquency inverts to a constant 100

use chrono::{Duration, NaiveDate};
use kshape_core::pipeline::composite::{inverted_delinquency, Delinquency};
use kshape_core::pipeline::{align_to_monthly, rebase};
use kshape_core::Table;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 1).unwrap()
}

/// A value that is missing about one time in five.
fn arb_cell() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(f64::NAN),
        1 => Just(0.0),
        3 => (0.01..10_000.0_f64),
    ]
}

/// Tables with 1..40 rows at random gaps of 1..45 days and 1..4 columns.
fn arb_table() -> impl Strategy<Value = Table> {
    (1usize..40, 1usize..4).prop_flat_map(|(rows, cols)| {
        (
            prop::collection::vec(1i64..45, rows),
            prop::collection::vec(prop::collection::vec(arb_cell(), rows), cols),
        )
            .prop_map(|(gaps, columns)| {
                let mut date = epoch();
                let dates = gaps
                    .iter()
                    .map(|gap| {
                        date += Duration::days(*gap);
                        date
                    })
                    .collect();
                let columns = columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, values)| (format!("S{i}"), values))
                    .collect();
                Table::from_columns(dates, columns).unwrap()
            })
    })
}

fn arb_baseline() -> impl Strategy<Value = NaiveDate> {
    (0i64..1_500).prop_map(|days| epoch() + Duration::days(days))
}

// ── 1–2. Rebase ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rebase_identity_at_baseline_row(table in arb_table(), baseline in arb_baseline()) {
        let row = table.nearest_row(baseline).unwrap();
        let rebased = rebase(&table, baseline).into_value();

        for ((name, before), (_, after)) in table.columns().zip(rebased.columns()) {
            let base = before[row];
            if base.is_finite() && base != 0.0 {
                prop_assert!((after[row] - 100.0).abs() < 1e-9, "{} = {}", name, after[row]);
            } else {
                prop_assert!(after.iter().all(|v| v.is_nan()), "{} should be all-missing", name);
            }
        }
    }

    #[test]
    fn rebase_never_produces_infinities(table in arb_table(), baseline in arb_baseline()) {
        let rebased = rebase(&table, baseline).into_value();
        for (_, values) in rebased.columns() {
            prop_assert!(values.iter().all(|v| !v.is_infinite()));
        }
    }
}

// ── 3–4. Alignment ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn alignment_is_idempotent(table in arb_table()) {
        let once = align_to_monthly(&table).into_value();
        let twice = align_to_monthly(&once).into_value();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn aligned_columns_never_regress_to_missing(table in arb_table()) {
        let aligned = align_to_monthly(&table).into_value();
        for (name, values) in aligned.columns() {
            if let Some(first) = values.iter().position(|v| !v.is_nan()) {
                prop_assert!(
                    values[first..].iter().all(|v| !v.is_nan()),
                    "{} has a gap after its first value",
                    name
                );
            }
        }
    }
}

// ── 5. Delinquency ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_delinquency_inverts_to_100(rate in 0.1..10.0_f64, rows in 1usize..30, at in 0usize..30) {
        let dates = (0..rows).map(|i| epoch() + Duration::days(31 * i as i64)).collect();
        let table = Table::from_columns(
            dates,
            vec![
                ("DRCCLACBS_RAW".into(), vec![rate; rows]),
                ("DRCLACBS_RAW".into(), vec![rate; rows]),
            ],
        )
        .unwrap();

        match inverted_delinquency(&table, at % rows) {
            Delinquency::Inverted(values) => {
                prop_assert!(values.iter().all(|v| *v == 100.0));
            }
            Delinquency::Neutral(reason) => prop_assert!(false, "unexpected neutral: {}", reason),
        }
    }
}
