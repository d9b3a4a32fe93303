//! The `fredgraph.csv` format: a date column followed by one value column.
//!
//! ```text
//! observation_date,UNRATE
//! 2020-01-01,3.6
//! 2020-02-01,.
//! ```
//!
//! Older downloads name the date column `DATE`. FRED writes `.` for missing
//! observations; those rows are dropped rather than turned into NaN.

use super::provider::{DataError, Observation};
use chrono::NaiveDate;

/// Parse a fredgraph CSV body into observations sorted by date.
///
/// The value column is the one headed by `series_id`; when no header matches,
/// the second column is used.
pub fn parse_fredgraph_csv(series_id: &str, body: &str) -> Result<Vec<Observation>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::ResponseFormatChanged(format!("{series_id}: header: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(DataError::ResponseFormatChanged(format!(
            "{series_id}: expected at least 2 columns, got {}",
            headers.len()
        )));
    }
    let value_idx = headers.iter().position(|h| h == series_id).unwrap_or(1);

    let mut observations = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| DataError::ResponseFormatChanged(format!("{series_id}: row {row}: {e}")))?;
        let date_str = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "{series_id}: row {row}: bad date '{date_str}': {e}"
            ))
        })?;

        match record.get(value_idx).map(str::parse::<f64>) {
            Some(Ok(value)) if value.is_finite() => observations.push(Observation { date, value }),
            _ => continue,
        }
    }

    observations.sort_by_key(|o| o.date);
    observations.dedup_by_key(|o| o.date);
    Ok(observations)
}

/// Render observations in fredgraph format (`observation_date,<SERIES_ID>`).
pub fn write_fredgraph_csv(series_id: &str, observations: &[Observation]) -> Result<String, DataError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["observation_date", series_id])
        .map_err(|e| DataError::Io(e.to_string()))?;
    for obs in observations {
        wtr.write_record([obs.date.format("%Y-%m-%d").to_string(), obs.value.to_string()])
            .map_err(|e| DataError::Io(e.to_string()))?;
    }
    let bytes = wtr.into_inner().map_err(|e| DataError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DataError::Io(e.to_string()))
}
