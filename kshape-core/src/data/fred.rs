//! FRED (Federal Reserve Economic Data) provider.
//!
//! Downloads the public `fredgraph.csv` export, which needs no API key. One
//! blocking request per series, no retries. The client carries an explicit
//! timeout so a stalled connection fails the series instead of hanging the run.

use super::fredgraph::parse_fredgraph_csv;
use super::provider::{DataError, DataSource, Observation, SeriesProvider};
use std::time::Duration;
use tracing::debug;

pub const FREDGRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.csv";

/// FRED data provider.
pub struct FredProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl FredProvider {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kshape/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: FREDGRAPH_URL.to_string(),
        })
    }

    /// Point the provider at a different fredgraph endpoint (mirrors, local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn series_url(&self, series_id: &str) -> String {
        format!("{}?id={series_id}", self.base_url)
    }
}

impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn source(&self) -> DataSource {
        DataSource::Fred
    }

    fn fetch(&self, series_id: &str) -> Result<Vec<Observation>, DataError> {
        let url = self.series_url(series_id);
        debug!(%url, "requesting series");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SeriesNotFound {
                series_id: series_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Http {
                series_id: series_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("{series_id}: body: {e}")))?;
        let observations = parse_fredgraph_csv(series_id, &body)?;
        debug!(series_id, count = observations.len(), "parsed series");
        Ok(observations)
    }
}
