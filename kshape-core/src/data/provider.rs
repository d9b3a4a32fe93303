//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over where observations come from (FRED
//! over HTTP, a local CSV directory, an in-memory map) so the pipeline can run
//! offline and tests can inject failures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// One dated value of an economic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Structured error types for series retrieval.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for series '{series_id}'")]
    Http { series_id: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("injected failure for series '{series_id}'")]
    Injected { series_id: String },
}

/// Where a series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Fred,
    LocalCsv,
    Memory,
}

/// A source of named numeric time series.
///
/// Implementations only fetch; memoization lives in `SeriesCache` above this trait.
pub trait SeriesProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Which kind of source this is.
    fn source(&self) -> DataSource;

    /// Fetch every observation the provider has for `series_id`, ascending by date.
    fn fetch(&self, series_id: &str) -> Result<Vec<Observation>, DataError>;
}

/// In-memory provider. Series listed in `failing` return an error instead of data.
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    series: HashMap<String, Vec<Observation>>,
    failing: HashSet<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series_id: &str, observations: Vec<Observation>) -> Self {
        self.series.insert(series_id.to_string(), observations);
        self
    }

    pub fn with_failure(mut self, series_id: &str) -> Self {
        self.failing.insert(series_id.to_string());
        self
    }

    pub fn insert(&mut self, series_id: &str, observations: Vec<Observation>) {
        self.series.insert(series_id.to_string(), observations);
    }
}

impl SeriesProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn source(&self) -> DataSource {
        DataSource::Memory
    }

    fn fetch(&self, series_id: &str) -> Result<Vec<Observation>, DataError> {
        if self.failing.contains(series_id) {
            return Err(DataError::Injected {
                series_id: series_id.to_string(),
            });
        }
        let mut observations = self
            .series
            .get(series_id)
            .cloned()
            .ok_or_else(|| DataError::SeriesNotFound {
                series_id: series_id.to_string(),
            })?;
        observations.sort_by_key(|o| o.date);
        Ok(observations)
    }
}
