//! Append-only raw observation table backed by a CSV file.

use crate::data::observation::{Observation, REQUIRED_RAW_COLUMNS};
use crate::error::PipelineError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Raw observations plus the header they were read with.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub observations: Vec<Observation>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Fail with `MissingColumn` for the first required column absent from the header.
    pub fn require_columns(&self) -> Result<(), PipelineError> {
        for column in REQUIRED_RAW_COLUMNS {
            if !self.headers.iter().any(|h| h == column) {
                return Err(PipelineError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The raw table on disk. Rows are only ever appended.
#[derive(Debug, Clone)]
pub struct RawStore {
    path: PathBuf,
}

impl RawStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole table.
    pub fn read_all(&self) -> Result<RawTable, PipelineError> {
        if !self.exists() {
            return Err(PipelineError::SourceNotFound {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut observations = Vec::new();
        for record in reader.deserialize::<Observation>() {
            observations.push(record?);
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = observations.len(),
            "Read raw observation table"
        );
        Ok(RawTable {
            headers,
            observations,
        })
    }

    /// Append observations, writing the header first when the file is new or empty.
    pub fn append(&self, observations: &[Observation]) -> Result<usize, PipelineError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for obs in observations {
            writer.serialize(obs)?;
        }
        writer.flush()?;

        tracing::info!(
            path = %self.path.display(),
            appended = observations.len(),
            "Appended observations to raw table"
        );
        Ok(observations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_source_not_found() {
        let store = RawStore::new("/nonexistent/raw_weather_data.csv");
        let err = store.read_all().unwrap_err();
        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let store = RawStore::new(dir.path().join("raw").join("raw_weather_data.csv"));

        store
            .append(&[Observation::new("2025-01-01 09:00", 80.0, 10.0, "Sunny", 30.0)])
            .unwrap();
        store
            .append(&[Observation::new("2025-01-01 15:00", 60.0, 5.0, "Cloudy", 32.0)])
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("date_time").count(), 1);

        let table = store.read_all().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.observations[1].condition.as_deref(), Some("Cloudy"));
        assert!(table.require_columns().is_ok());
    }

    #[test]
    fn test_blank_cells_read_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(
            &path,
            "date_time,city,temp_c,humidity,wind_kph,condition\n\
             2025-01-01 09:00,Jakarta,,80,10,Sunny\n",
        )
        .unwrap();

        let table = RawStore::new(&path).read_all().unwrap();
        assert_eq!(table.observations[0].temp_c, None);
        assert_eq!(table.observations[0].humidity, Some(80.0));
        assert_eq!(table.observations[0].vis_km, None);
    }

    #[test]
    fn test_require_columns_names_the_gap() {
        let table = RawTable {
            headers: vec!["date_time".into(), "humidity".into(), "temp_c".into()],
            observations: Vec::new(),
        };
        match table.require_columns() {
            Err(PipelineError::MissingColumn { column }) => assert_eq!(column, "wind_kph"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }
}
