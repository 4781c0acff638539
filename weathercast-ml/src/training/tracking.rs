//! Experiment tracking seam.
//!
//! The trainer reports each run's parameters, metrics, and model location to a
//! [`RunTracker`]. Tracking is best-effort: the trainer logs a warning and
//! carries on when a tracker call fails.

use crate::error::PipelineError;
use crate::training::metrics::MetricsReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub seed: u64,
    pub test_ratio: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Where a run's model ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub bundle_id: String,
    pub path: PathBuf,
}

pub trait RunTracker: Send + Sync {
    fn log_params(&mut self, params: &RunParams) -> Result<(), PipelineError>;
    fn log_metrics(&mut self, metrics: &MetricsReport) -> Result<(), PipelineError>;
    /// Called last; closes the run.
    fn log_model(&mut self, model: &ModelRef) -> Result<(), PipelineError>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl RunTracker for NoopTracker {
    fn log_params(&mut self, _params: &RunParams) -> Result<(), PipelineError> {
        Ok(())
    }

    fn log_metrics(&mut self, _metrics: &MetricsReport) -> Result<(), PipelineError> {
        Ok(())
    }

    fn log_model(&mut self, _model: &ModelRef) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// One line of the runs log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub recorded_at: DateTime<Utc>,
    pub params: Option<RunParams>,
    pub metrics: Option<MetricsReport>,
    pub model: ModelRef,
}

/// Appends one JSON object per completed run to a file.
#[derive(Debug, Clone)]
pub struct JsonlRunTracker {
    path: PathBuf,
    params: Option<RunParams>,
    metrics: Option<MetricsReport>,
}

impl JsonlRunTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            params: None,
            metrics: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every run recorded so far, oldest first.
    pub fn history(&self) -> Result<Vec<RunRecord>, PipelineError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(PipelineError::from))
            .collect()
    }
}

impl RunTracker for JsonlRunTracker {
    fn log_params(&mut self, params: &RunParams) -> Result<(), PipelineError> {
        self.params = Some(params.clone());
        Ok(())
    }

    fn log_metrics(&mut self, metrics: &MetricsReport) -> Result<(), PipelineError> {
        self.metrics = Some(*metrics);
        Ok(())
    }

    fn log_model(&mut self, model: &ModelRef) -> Result<(), PipelineError> {
        let record = RunRecord {
            run_id: uuid::Uuid::new_v4().to_string(),
            recorded_at: Utc::now(),
            params: self.params.take(),
            metrics: self.metrics.take(),
            model: model.clone(),
        };
        let line = serde_json::to_string(&record)?;
        weathercast_core::persistence::append_line(&self.path, &line)?;
        tracing::debug!(run_id = %record.run_id, path = %self.path.display(), "Recorded training run");
        Ok(())
    }
}
