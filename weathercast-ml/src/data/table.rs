//! The transformed feature table: scaled feature columns plus the target.

use crate::error::PipelineError;
use crate::features::schema::{FeatureVector, N_FEATURES, feature_matrix, table_columns};
use ndarray::Array2;
use std::path::Path;

/// Scaled, encoded feature rows and their targets, row-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub features: Vec<FeatureVector>,
    pub target: Vec<f64>,
}

impl FeatureTable {
    pub fn new(features: Vec<FeatureVector>, target: Vec<f64>) -> Self {
        debug_assert_eq!(features.len(), target.len());
        Self { features, target }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Column header of the persisted table.
    pub fn columns(&self) -> Vec<String> {
        table_columns()
    }

    /// Feature rows as an `n × N_FEATURES` matrix.
    pub fn matrix(&self) -> Array2<f64> {
        feature_matrix(&self.features)
    }

    /// Rows at the given indices, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i]).collect(),
            target: indices.iter().map(|&i| self.target[i]).collect(),
        }
    }

    /// Serialize as CSV bytes.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.columns())?;
        for (row, target) in self.features.iter().zip(&self.target) {
            let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            record.push(target.to_string());
            writer.write_record(&record)?;
        }
        writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }

    /// Write the table atomically.
    pub fn write_csv(&self, path: &Path) -> Result<(), PipelineError> {
        let bytes = self.to_csv_bytes()?;
        weathercast_core::persistence::atomic_write(path, &bytes)?;
        Ok(())
    }

    /// Read a table written by [`FeatureTable::write_csv`].
    ///
    /// The header must match the fixed column layout exactly; a table built
    /// for a different layout is rejected rather than reinterpreted.
    pub fn read_csv(path: &Path) -> Result<Self, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let expected = table_columns();
        let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if found != expected {
            return Err(PipelineError::SchemaMismatch { expected, found });
        }

        let mut features = Vec::new();
        let mut target = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let mut values = [0.0; N_FEATURES + 1];
            for (slot, field) in values.iter_mut().zip(record.iter()) {
                *slot = field.parse::<f64>().map_err(|_| {
                    PipelineError::SchemaMismatch {
                        expected: expected.clone(),
                        found: vec![format!("row {}: non-numeric value {field:?}", idx + 1)],
                    }
                })?;
            }
            let mut row = [0.0; N_FEATURES];
            row.copy_from_slice(&values[..N_FEATURES]);
            features.push(row);
            target.push(values[N_FEATURES]);
        }
        Ok(Self { features, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table() -> FeatureTable {
        FeatureTable::new(
            vec![
                [1.0, 1.0, -1.0, 0.0, 0.0, 0.0, 1.0],
                [-1.0, -1.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            ],
            vec![30.0, 32.0],
        )
    }

    #[test]
    fn test_write_then_read_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed").join("features.csv");
        let mut original = table();
        original.features[0][0] = 0.1 + 0.2;

        original.write_csv(&path).unwrap();
        let loaded = FeatureTable::read_csv(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_header_is_features_then_target() {
        let bytes = table().to_csv_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "humidity,wind_kph,hour,day,month,day_of_year,weather_condition,temp_c"
        );
    }

    #[test]
    fn test_reordered_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("features.csv");
        std::fs::write(
            &path,
            "wind_kph,humidity,hour,day,month,day_of_year,weather_condition,temp_c\n\
             1,1,1,0,0,0,1,30\n",
        )
        .unwrap();
        let err = FeatureTable::read_csv(&path).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_table_is_source_not_found() {
        let err = FeatureTable::read_csv(Path::new("/nonexistent/features.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }

    #[test]
    fn test_select_keeps_rows_aligned() {
        let picked = table().select(&[1]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked.target, vec![32.0]);
        assert_eq!(picked.features[0][0], -1.0);
    }
}
