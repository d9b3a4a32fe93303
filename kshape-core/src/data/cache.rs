//! In-process memo of fetched series and of the merged dataset.
//!
//! Keys are `(provider series id, internal column name)`. Only successful
//! fetches are stored; a failed series is retried on the next request.
//! `reset()` empties everything.

use super::provider::{DataError, Observation, SeriesProvider};
use crate::outcome::Outcome;
use crate::table::Table;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub series_id: String,
    pub column: String,
}

impl SeriesKey {
    pub fn new(series_id: &str, column: &str) -> Self {
        Self {
            series_id: series_id.to_string(),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SeriesCache {
    series: HashMap<SeriesKey, Vec<Observation>>,
    merged: Option<Outcome<Table>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached observations for `key`, fetching through `provider` on a miss.
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn SeriesProvider,
        key: &SeriesKey,
    ) -> Result<&[Observation], DataError> {
        if self.series.contains_key(key) {
            debug!(series_id = %key.series_id, column = %key.column, "series cache hit");
        } else {
            let observations = provider.fetch(&key.series_id)?;
            debug!(
                series_id = %key.series_id,
                provider = provider.name(),
                count = observations.len(),
                "fetched series"
            );
            self.series.insert(key.clone(), observations);
        }
        Ok(self.series[key].as_slice())
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.series.contains_key(key)
    }

    /// Number of cached series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.merged.is_none()
    }

    pub fn merged(&self) -> Option<&Outcome<Table>> {
        self.merged.as_ref()
    }

    pub fn set_merged(&mut self, merged: Outcome<Table>) {
        self.merged = Some(merged);
    }

    /// Drop every cached series and the merged dataset.
    pub fn reset(&mut self) {
        self.series.clear();
        self.merged = None;
    }
}
