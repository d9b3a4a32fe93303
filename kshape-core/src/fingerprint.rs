//! Deterministic identification of pipeline runs.
//!
//! - `config_hash`: BLAKE3 over the canonical JSON of the configuration.
//! - `Table::fingerprint`: BLAKE3 over the table's dates, column names and value bits.
//! - `RunFingerprint`: summary record of one run, printed by the CLI as JSON.

use crate::config::PipelineConfig;
use crate::outcome::Outcome;
use crate::pipeline::PipelineOutput;
use crate::table::Table;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hash of the full configuration. Any change to dates, series or schedule changes it.
pub fn config_hash(config: &PipelineConfig) -> String {
    let json = serde_json::to_string(config).expect("PipelineConfig must serialize");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

impl Table {
    /// BLAKE3 hex digest of the table contents.
    ///
    /// Missing values hash as the canonical `NaN` so equal tables give equal digests.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.height() as u64).to_le_bytes());
        for date in self.dates() {
            hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
        }
        for (name, values) in self.columns() {
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            for v in values {
                let bits = if v.is_nan() { f64::NAN.to_bits() } else { v.to_bits() };
                hasher.update(&bits.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Complete fingerprint of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFingerprint {
    // ── Identity ──
    pub generated_at: chrono::NaiveDateTime,
    pub provider: String,

    // ── Configuration ──
    pub baseline_date: NaiveDate,
    pub start_date: NaiveDate,
    pub series_count: usize,

    // ── Result ──
    pub rows: usize,
    pub columns: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub baseline_row: Option<NaiveDate>,
    pub warning_count: usize,

    // ── Derived hashes ──
    pub config_hash: String,
    pub table_hash: String,
}

impl RunFingerprint {
    pub fn new(config: &PipelineConfig, provider: &str, outcome: &Outcome<PipelineOutput>) -> Self {
        let output = outcome.value();
        Self {
            generated_at: chrono::Local::now().naive_local(),
            provider: provider.to_string(),
            baseline_date: config.baseline_date,
            start_date: config.start_date,
            series_count: config.series.len(),
            rows: output.table.height(),
            columns: output.table.width(),
            first_date: output.table.first_date(),
            last_date: output.table.last_date(),
            baseline_row: output.baseline_row,
            warning_count: outcome.warnings().len(),
            config_hash: config_hash(config),
            table_hash: output.table.fingerprint(),
        }
    }

    /// True when both runs used the same configuration and produced the same table.
    pub fn same_result(&self, other: &Self) -> bool {
        self.config_hash == other.config_hash && self.table_hash == other.table_hash
    }
}
