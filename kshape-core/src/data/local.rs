//! Offline provider: one fredgraph CSV per series in a directory.
//!
//! Layout: `{dir}/{SERIES_ID}.csv`, as written by `save_series`.

use super::fredgraph::{parse_fredgraph_csv, write_fredgraph_csv};
use super::provider::{DataError, DataSource, Observation, SeriesProvider};
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalCsvProvider {
    dir: PathBuf,
}

impl LocalCsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn series_path(&self, series_id: &str) -> PathBuf {
        series_path(&self.dir, series_id)
    }
}

impl SeriesProvider for LocalCsvProvider {
    fn name(&self) -> &str {
        "local_csv"
    }

    fn source(&self) -> DataSource {
        DataSource::LocalCsv
    }

    fn fetch(&self, series_id: &str) -> Result<Vec<Observation>, DataError> {
        let path = self.series_path(series_id);
        if !path.exists() {
            return Err(DataError::SeriesNotFound {
                series_id: series_id.to_string(),
            });
        }
        let body = fs::read_to_string(&path)
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;
        parse_fredgraph_csv(series_id, &body)
    }
}

fn series_path(dir: &Path, series_id: &str) -> PathBuf {
    dir.join(format!("{series_id}.csv"))
}

/// Write observations to `{dir}/{SERIES_ID}.csv`, creating `dir` if needed.
///
/// Writes go to a `.tmp` sibling first and are renamed into place.
pub fn save_series(dir: &Path, series_id: &str, observations: &[Observation]) -> Result<PathBuf, DataError> {
    fs::create_dir_all(dir).map_err(|e| DataError::Io(format!("create {}: {e}", dir.display())))?;

    let path = series_path(dir, series_id);
    let tmp_path = path.with_extension("csv.tmp");
    let body = write_fredgraph_csv(series_id, observations)?;
    fs::write(&tmp_path, body).map_err(|e| DataError::Io(format!("write {}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DataError::Io(format!("atomic rename failed: {e}"))
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn save_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let obs = vec![
            Observation::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 16896.0),
            Observation::new(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(), 16930.0),
        ];
        let path = save_series(dir.path(), "USLAH", &obs).unwrap();
        assert!(path.ends_with("USLAH.csv"));

        let provider = LocalCsvProvider::new(dir.path());
        assert_eq!(provider.fetch("USLAH").unwrap(), obs);
    }

    #[test]
    fn missing_file_is_series_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalCsvProvider::new(dir.path());
        match provider.fetch("DRCCLACBS") {
            Err(DataError::SeriesNotFound { series_id }) => assert_eq!(series_id, "DRCCLACBS"),
            other => panic!("expected SeriesNotFound, got {other:?}"),
        }
    }
}
