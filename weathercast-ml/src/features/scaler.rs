//! Per-column standardization over encoded feature vectors.

use crate::features::schema::{
    FEATURE_COLUMNS, FeatureVector, N_FEATURES, feature_columns, feature_matrix,
    matches_feature_columns,
};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};

/// Scale used for columns whose training-time standard deviation is zero.
///
/// Such columns are only centered, which maps every training value to 0.
pub const ZERO_VARIANCE_SCALE: f64 = 1.0;

/// Mean and population standard deviation of each feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
    n_samples: usize,
}

impl StandardScaler {
    /// Fit over encoded, unscaled rows. Returns `None` for an empty table.
    pub fn fit(rows: &[FeatureVector]) -> Option<Self> {
        let x = feature_matrix(rows);
        let mut mean = x.mean_axis(Axis(0))?;
        let std = x.std_axis(Axis(0), 0.0);
        let mut scale = Array1::from_elem(N_FEATURES, ZERO_VARIANCE_SCALE);

        for (col, column) in x.axis_iter(Axis(1)).enumerate() {
            let first = column[0];
            if column.iter().all(|v| *v == first) {
                // Exact centering; the summed mean can be off by an ulp.
                mean[col] = first;
            } else if std[col] > 0.0 && std[col].is_finite() {
                scale[col] = std[col];
            }
        }

        Some(Self {
            columns: feature_columns(),
            mean: mean.to_vec(),
            scale: scale.to_vec(),
            n_samples: rows.len(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn means(&self) -> &[f64] {
        &self.mean
    }

    pub fn scales(&self) -> &[f64] {
        &self.scale
    }

    /// Number of rows the statistics were computed over.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Standardize one row with the fitted statistics.
    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = *row;
        for (col, value) in out.iter_mut().enumerate() {
            *value = (*value - self.mean[col]) / self.scale[col];
        }
        out
    }

    /// Standardize many rows.
    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|r| self.transform(r)).collect()
    }

    /// Check the invariants a deserialized scaler must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if !matches_feature_columns(&self.columns) {
            return Err(format!(
                "scaler columns {:?} do not match feature order {:?}",
                self.columns, FEATURE_COLUMNS
            ));
        }
        if self.mean.len() != N_FEATURES || self.scale.len() != N_FEATURES {
            return Err("scaler statistics have the wrong width".to_string());
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("scaler mean is not finite".to_string());
        }
        if self.scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err("scaler scale must be finite and positive".to_string());
        }
        Ok(())
    }
}
