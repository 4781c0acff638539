//! Held-out regression metrics.

use crate::error::PipelineError;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Regression metrics over the test partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl MetricsReport {
    /// Compare predictions against actual targets.
    ///
    /// R² is undefined when the actual values are constant; it is reported as
    /// 1 if every prediction is exact and 0 otherwise. Returns `None` for
    /// empty or misaligned inputs.
    pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        if actual.len() != predicted.len() {
            return None;
        }
        let actual = ArrayView1::from(actual);
        let errors = &actual - &ArrayView1::from(predicted);
        let mean = actual.mean()?;
        let n = actual.len() as f64;

        let sse = errors.dot(&errors);
        let sae = errors.mapv(f64::abs).sum();
        let sst = actual.mapv(|a| (a - mean).powi(2)).sum();
        let r2 = if sst > 0.0 {
            1.0 - sse / sst
        } else if sse == 0.0 {
            1.0
        } else {
            0.0
        };

        Some(Self {
            rmse: (sse / n).sqrt(),
            mae: sae / n,
            r2,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        weathercast_core::persistence::atomic_write_json(path, self)?;
        Ok(())
    }

    /// Load a saved report. `Ok(None)` when none has been written yet.
    pub fn load(path: &Path) -> Result<Option<Self>, PipelineError> {
        Ok(weathercast_core::persistence::load_json(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_perfect_predictions() {
        let m = MetricsReport::evaluate(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_known_errors() {
        let m = MetricsReport::evaluate(&[1.0, 2.0, 3.0, 4.0], &[2.0, 2.0, 3.0, 2.0]).unwrap();
        // errors -1, 0, 0, 2: sse 5, sae 3, sst 5
        assert!((m.rmse - (5.0_f64 / 4.0).sqrt()).abs() < 1e-12);
        assert_eq!(m.mae, 0.75);
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_constant_target() {
        let exact = MetricsReport::evaluate(&[5.0], &[5.0]).unwrap();
        assert_eq!(exact.r2, 1.0);
        let off = MetricsReport::evaluate(&[5.0, 5.0], &[4.0, 6.0]).unwrap();
        assert_eq!(off.r2, 0.0);
        assert_eq!(off.mae, 1.0);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(MetricsReport::evaluate(&[], &[]).is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report").join("metrics.json");
        assert_eq!(MetricsReport::load(&path).unwrap(), None);

        let m = MetricsReport {
            rmse: 1.25,
            mae: 0.5,
            r2: 0.9,
        };
        m.save(&path).unwrap();
        assert_eq!(MetricsReport::load(&path).unwrap(), Some(m));
    }
}
