//! Table export: CSV for spreadsheets and dashboards, Parquet for analysis tools.
//!
//! Both formats have a leading `date` column followed by the table columns in
//! order. Missing values are empty CSV cells and Parquet nulls.

use crate::table::Table;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("unsupported output format '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),
}

/// Render the table as CSV: header `date,<columns...>`, dates `YYYY-MM-DD`.
pub fn export_csv(table: &Table) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["date"];
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = table.columns().map(|(_, values)| values).collect();
    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(columns.iter().map(|values| {
            let v = values[row];
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        wtr.write_record(&record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn table_to_dataframe(table: &Table) -> Result<DataFrame, ExportError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let days: Vec<i32> = table
        .dates()
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = vec![Column::new("date".into(), days)
        .cast(&DataType::Date)
        .map_err(|e| ExportError::Parquet(format!("date cast: {e}")))?];
    for (name, values) in table.columns() {
        let values: Vec<Option<f64>> = values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        columns.push(Column::new(name.into(), values));
    }

    DataFrame::new(columns).map_err(|e| ExportError::Parquet(format!("dataframe creation: {e}")))
}

/// Write the table as Parquet. Writes go to `.tmp` first and are renamed into place.
pub fn write_parquet(table: &Table, path: &Path) -> Result<(), ExportError> {
    let mut df = table_to_dataframe(table)?;
    let tmp_path = path.with_extension("parquet.tmp");

    let file = fs::File::create(&tmp_path)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| ExportError::Parquet(format!("write parquet: {e}")))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ExportError::Io(e)
    })?;
    Ok(())
}

/// Write the table to `path`, choosing CSV or Parquet from the extension.
pub fn write_table(table: &Table, path: &Path) -> Result<(), ExportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let body = export_csv(table)?;
            let tmp_path = path.with_extension("csv.tmp");
            fs::write(&tmp_path, body)?;
            fs::rename(&tmp_path, path)?;
        }
        "parquet" => write_parquet(table, path)?,
        other => return Err(ExportError::UnsupportedFormat(other.to_string())),
    }

    info!(path = %path.display(), rows = table.height(), "table written");
    Ok(())
}
