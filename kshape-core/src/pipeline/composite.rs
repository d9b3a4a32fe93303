//! Composite indices for the two arms of the K.
//!
//! `K_UPPER` tracks asset holders (equities, top-half wealth share).
//! `K_LOWER` tracks wage earners (low-wage employment, real wage, inverted
//! consumer delinquency, bottom-half wealth share).
//!
//! Each logical input has a fixed preference list of candidate columns. A raw
//! candidate is re-indexed to 100 at the baseline row on the fly; an indexed
//! candidate is taken as is. The first usable candidate wins.

use crate::outcome::{Outcome, PipelineWarning};
use crate::table::{all_missing, Table};
use chrono::NaiveDate;
use tracing::{debug, warn};

pub const K_UPPER: &str = "K_UPPER";
pub const K_LOWER: &str = "K_LOWER";
/// 1.0 when `K_LOWER` used the nominal wage in place of the real wage.
pub const K_LOWER_NOMINAL_WAGE: &str = "K_LOWER_NOMINAL_WAGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Original-unit column, re-indexed against its baseline value.
    Raw(&'static str),
    /// Column already indexed to 100 at the baseline.
    Indexed(&'static str),
}

impl Candidate {
    pub fn column(&self) -> &'static str {
        match self {
            Candidate::Raw(name) | Candidate::Indexed(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogicalInput {
    pub name: &'static str,
    pub candidates: &'static [Candidate],
}

pub const EQUITIES: LogicalInput = LogicalInput {
    name: "equities",
    candidates: &[Candidate::Raw("SP500_RAW"), Candidate::Indexed("SP500")],
};

pub const UPPER_WEALTH: LogicalInput = LogicalInput {
    name: "upper wealth",
    candidates: &[
        Candidate::Raw("WEALTH_TOP50_RAW"),
        Candidate::Indexed("WEALTH_TOP50"),
        Candidate::Raw("WEALTH_TOP1_RAW"),
        Candidate::Indexed("WEALTH_TOP1"),
    ],
};

pub const LOW_WAGE_EMPLOYMENT: LogicalInput = LogicalInput {
    name: "low-wage employment",
    candidates: &[
        Candidate::Raw("EMP_LOW_WAGE_RAW"),
        Candidate::Indexed("EMP_LOW_WAGE"),
    ],
};

pub const REAL_WAGE: LogicalInput = LogicalInput {
    name: "real wage",
    candidates: &[
        Candidate::Raw("REAL_WAGE_LOW_WAGE_RAW"),
        Candidate::Indexed("REAL_WAGE_LOW_WAGE"),
    ],
};

pub const NOMINAL_WAGE: LogicalInput = LogicalInput {
    name: "nominal wage",
    candidates: &[
        Candidate::Raw("WAGE_LOW_WAGE_RAW"),
        Candidate::Indexed("WAGE_LOW_WAGE"),
    ],
};

pub const BOTTOM_WEALTH: LogicalInput = LogicalInput {
    name: "bottom wealth",
    candidates: &[
        Candidate::Raw("WEALTH_BOTTOM50_RAW"),
        Candidate::Indexed("WEALTH_BOTTOM50"),
    ],
};

/// Delinquency rates in percent. Only original-unit columns are averaged;
/// rebased delinquency columns are never mixed in.
pub const DELINQUENCY: [&str; 2] = ["DRCCLACBS_RAW", "DRCLACBS_RAW"];

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Series { source: Candidate, values: Vec<f64> },
    Absent,
}

impl Resolved {
    fn values(&self) -> Option<&[f64]> {
        match self {
            Resolved::Series { values, .. } => Some(values),
            Resolved::Absent => None,
        }
    }
}

/// First usable candidate of `input`.
///
/// `Raw` needs a finite, non-zero value at `baseline_row`; `Indexed` only needs
/// the column to exist.
pub fn resolve(table: &Table, input: &LogicalInput, baseline_row: usize) -> Resolved {
    for candidate in input.candidates {
        let Some(values) = table.column(candidate.column()) else {
            continue;
        };
        match candidate {
            Candidate::Raw(_) => {
                let base = values[baseline_row];
                if base.is_finite() && base != 0.0 {
                    return Resolved::Series {
                        source: *candidate,
                        values: values.iter().map(|v| v / base * 100.0).collect(),
                    };
                }
            }
            Candidate::Indexed(_) => {
                return Resolved::Series {
                    source: *candidate,
                    values: values.to_vec(),
                };
            }
        }
    }
    Resolved::Absent
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delinquency {
    /// `100 − (avg − base) / base × 100`: rising delinquency lowers the index.
    Inverted(Vec<f64>),
    /// Constant 100; excluded from the lower composite.
    Neutral(&'static str),
}

/// Inverted index of the average available delinquency rate.
///
/// The row-wise average skips missing values. `base` is the average at
/// `baseline_row`.
pub fn inverted_delinquency(table: &Table, baseline_row: usize) -> Delinquency {
    let columns: Vec<&[f64]> = DELINQUENCY
        .iter()
        .filter_map(|name| table.column(name))
        .collect();
    if columns.is_empty() {
        return Delinquency::Neutral("no delinquency columns");
    }

    let average: Vec<f64> = (0..table.height())
        .map(|row| {
            let present: Vec<f64> = columns
                .iter()
                .map(|column| column[row])
                .filter(|v| !v.is_nan())
                .collect();
            if present.is_empty() {
                f64::NAN
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            }
        })
        .collect();

    let base = average[baseline_row];
    if !base.is_finite() || base == 0.0 {
        return Delinquency::Neutral("zero or missing delinquency at the baseline row");
    }
    Delinquency::Inverted(
        average
            .iter()
            .map(|avg| 100.0 - (avg - base) / base * 100.0)
            .collect(),
    )
}

/// Row-wise mean of the participating inputs. Missing propagates; no inputs
/// gives an all-missing column.
fn mean_of(inputs: &[&[f64]], height: usize) -> Vec<f64> {
    if inputs.is_empty() {
        return vec![f64::NAN; height];
    }
    (0..height)
        .map(|row| inputs.iter().map(|values| values[row]).sum::<f64>() / inputs.len() as f64)
        .collect()
}

/// Collect the participating inputs of a composite, recording the absent ones.
fn participating<'a>(
    composite: &'static str,
    inputs: &[(&'static str, &'a Resolved)],
    warnings: &mut Vec<PipelineWarning>,
) -> Vec<&'a [f64]> {
    inputs
        .iter()
        .filter_map(|&(name, resolved)| {
            let values = resolved.values();
            if values.is_none() {
                warn!(composite, input = name, "composite input absent");
                warnings.push(PipelineWarning::CompositeInputAbsent {
                    composite,
                    input: name,
                });
            }
            values
        })
        .collect()
}

/// Append `K_UPPER`, `K_LOWER` and `K_LOWER_NOMINAL_WAGE` to a copy of `table`.
///
/// Pure function of the table and the baseline date.
pub fn build_composites(table: &Table, baseline: NaiveDate) -> Outcome<Table> {
    let mut out = table.clone();
    let Some(row) = table.nearest_row(baseline) else {
        warn!("composite: empty input table");
        out.set_column(K_UPPER, Vec::new());
        out.set_column(K_LOWER, Vec::new());
        out.set_column(K_LOWER_NOMINAL_WAGE, Vec::new());
        return Outcome::Degraded {
            value: out,
            warnings: vec![PipelineWarning::EmptyTable { stage: "composite" }],
        };
    };
    let height = table.height();
    let mut warnings = Vec::new();

    let equities = resolve(table, &EQUITIES, row);
    let upper_wealth = resolve(table, &UPPER_WEALTH, row);
    let upper = participating(
        K_UPPER,
        &[(EQUITIES.name, &equities), (UPPER_WEALTH.name, &upper_wealth)],
        &mut warnings,
    );
    let k_upper = mean_of(&upper, height);

    let employment = resolve(table, &LOW_WAGE_EMPLOYMENT, row);
    let real_wage = resolve(table, &REAL_WAGE, row);
    let real_unusable = real_wage.values().map_or(true, all_missing);
    let mut nominal_used = false;
    let wage = if real_unusable {
        match resolve(table, &NOMINAL_WAGE, row) {
            Resolved::Absent => real_wage,
            Resolved::Series { source, values } => {
                warn!(column = source.column(), "real wage unavailable, using nominal wage");
                warnings.push(PipelineWarning::NominalWageSubstituted {
                    column: source.column().to_string(),
                });
                nominal_used = true;
                Resolved::Series { source, values }
            }
        }
    } else {
        real_wage
    };
    let bottom_wealth = resolve(table, &BOTTOM_WEALTH, row);

    let delinquency = inverted_delinquency(table, row);
    let mut lower = participating(
        K_LOWER,
        &[
            (LOW_WAGE_EMPLOYMENT.name, &employment),
            ("wage", &wage),
            (BOTTOM_WEALTH.name, &bottom_wealth),
        ],
        &mut warnings,
    );
    match &delinquency {
        Delinquency::Inverted(values) => lower.push(values),
        &Delinquency::Neutral(reason) => {
            warn!(reason, "delinquency index neutral");
            warnings.push(PipelineWarning::NeutralDelinquency { reason });
        }
    }
    let k_lower = mean_of(&lower, height);

    debug!(
        upper_inputs = upper.len(),
        lower_inputs = lower.len(),
        nominal_used,
        "composites built"
    );

    out.set_column(K_UPPER, k_upper);
    out.set_column(K_LOWER, k_lower);
    out.set_column(
        K_LOWER_NOMINAL_WAGE,
        vec![if nominal_used { 1.0 } else { 0.0 }; height],
    );
    Outcome::from_parts(out, warnings)
}
