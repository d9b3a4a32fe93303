//! Pipeline configuration: dates, the series to fetch, and the tariff schedule.
//!
//! Loaded once per process, from TOML or from the built-in defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Columns the pipeline writes itself; a configured series may not claim them.
const RESERVED_NAMES: [&str; 6] = [
    crate::pipeline::TARIFF_COLUMN,
    crate::pipeline::derive::REAL_WAGE,
    crate::pipeline::derive::UPPER_WEALTH,
    crate::pipeline::K_UPPER,
    crate::pipeline::K_LOWER,
    crate::pipeline::K_LOWER_NOMINAL_WAGE,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One external series and the column it lands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Internal column name (e.g. `EMP_LOW_WAGE`).
    pub name: String,
    /// Provider identifier (e.g. `USLAH`).
    pub series_id: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
}

impl SeriesSpec {
    pub fn new(name: &str, series_id: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            series_id: series_id.to_string(),
            label: label.to_string(),
        }
    }
}

/// A step of the synthesized tariff series: `value` applies from `effective` on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStep {
    pub effective: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Observations before this date are dropped at fetch time.
    pub start_date: NaiveDate,

    /// Every rebased series equals 100 at the row nearest this date.
    pub baseline_date: NaiveDate,

    /// HTTP request timeout for remote providers, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Series to fetch, in column order.
    pub series: Vec<SeriesSpec>,

    /// Ordered tariff schedule used to synthesize `TARIFF_RATE`.
    #[serde(default)]
    pub tariff_schedule: Vec<ScheduleStep>,
}

fn default_timeout_secs() -> u64 {
    60
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid built-in date")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let series = vec![
            SeriesSpec::new("FEDFUNDS", "FEDFUNDS", "Fed Funds Rate (%)"),
            SeriesSpec::new("UNRATE", "UNRATE", "Unemployment Rate (%)"),
            SeriesSpec::new("PAYEMS", "PAYEMS", "Nonfarm Employment (Thousands)"),
            SeriesSpec::new("SP500", "SP500", "S&P 500 Index"),
            SeriesSpec::new("WEALTH_TOP1", "WFRBST01134", "Top 1% Wealth Share (%)"),
            SeriesSpec::new(
                "EMP_LOW_WAGE",
                "USLAH",
                "Leisure & Hospitality Employment (Thousands)",
            ),
            SeriesSpec::new("WAGE_LOW_WAGE", "CES7000000008", "L&H Avg Hourly Wages ($)"),
            SeriesSpec::new("CPIAUCSL", "CPIAUCSL", "CPI Urban Consumers (All Items)"),
            SeriesSpec::new("DRCCLACBS", "DRCCLACBS", "Credit Card Delinquency (%)"),
            SeriesSpec::new("DRCLACBS", "DRCLACBS", "Consumer Loan Delinquency (%)"),
            SeriesSpec::new("WEALTH_TOP0_1", "WFRBSTP1300", "Top 0.1% Wealth Share (%)"),
            SeriesSpec::new("WEALTH_99_999", "WFRBS99T999273", "99-99.9% Wealth Share (%)"),
            SeriesSpec::new("WEALTH_NEXT9", "WFRBSN09161", "90-99th Wealth Share (%)"),
            SeriesSpec::new("WEALTH_NEXT40", "WFRBSN40188", "50-90th Wealth Share (%)"),
            SeriesSpec::new("WEALTH_BOTTOM50", "WFRBSB50215", "Bottom 50% Wealth Share (%)"),
        ];

        Self {
            start_date: ymd(2017, 1, 1),
            baseline_date: ymd(2020, 1, 1),
            http_timeout_secs: default_timeout_secs(),
            series,
            tariff_schedule: vec![
                ScheduleStep { effective: ymd(2017, 1, 1), value: 0.0 },
                ScheduleStep { effective: ymd(2018, 7, 6), value: 25.0 },
                ScheduleStep { effective: ymd(2024, 4, 1), value: 34.0 },
                ScheduleStep { effective: ymd(2025, 12, 1), value: 10.0 },
            ],
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.is_empty() {
            return Err(ConfigError::Invalid("no series configured".into()));
        }

        let mut names = HashSet::new();
        for spec in &self.series {
            if spec.name.trim().is_empty() || spec.series_id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "series entry has an empty name or id: {spec:?}"
                )));
            }
            if spec.name.ends_with(crate::pipeline::RAW_SUFFIX) {
                return Err(ConfigError::Invalid(format!(
                    "series name '{}' must not end with the reserved suffix '{}'",
                    spec.name,
                    crate::pipeline::RAW_SUFFIX
                )));
            }
            if RESERVED_NAMES.contains(&spec.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "series name '{}' is reserved for a column the pipeline writes",
                    spec.name
                )));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate series name '{}'",
                    spec.name
                )));
            }
        }

        if let Some(w) = self
            .tariff_schedule
            .windows(2)
            .find(|w| w[0].effective >= w[1].effective)
        {
            return Err(ConfigError::Invalid(format!(
                "tariff schedule must be strictly ascending ({} is not before {})",
                w[0].effective, w[1].effective
            )));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid("http_timeout_secs must be > 0".into()));
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}
