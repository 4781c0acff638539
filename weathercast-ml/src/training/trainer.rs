//! Model trainer: fits the regression on the transformed table, evaluates it
//! on a held-out split, and persists the model next to its transforms.

use crate::artifact::{ArtifactEnvelope, ArtifactKind, ArtifactPaths};
use crate::data::table::FeatureTable;
use crate::error::PipelineError;
use crate::features::scaler::StandardScaler;
use crate::features::schema::FEATURE_COLUMNS;
use crate::training::linear::{LinearRegression, Regressor};
use crate::training::metrics::MetricsReport;
use crate::training::split::split_indices;
use crate::training::tracking::{JsonlRunTracker, ModelRef, RunParams, RunTracker};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use weathercast_core::persistence::StagedWrite;
use weathercast_core::{PathsConfig, TrainingConfig};

/// Split and validation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerOptions {
    pub test_ratio: f64,
    pub seed: u64,
    pub scale_tolerance: f64,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

impl From<&TrainingConfig> for TrainerOptions {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            test_ratio: config.test_ratio,
            seed: config.seed,
            scale_tolerance: config.scale_tolerance,
        }
    }
}

/// Reject a table whose feature columns were not produced by the scaler.
///
/// Each column must have mean ≈ 0 and variance ≈ 1, or variance ≈ 0 for a
/// column that was constant during fitting.
pub fn check_standardized(table: &FeatureTable, tolerance: f64) -> Result<(), PipelineError> {
    let x = table.matrix();
    let Some(means) = x.mean_axis(Axis(0)) else {
        return Ok(());
    };
    let variances = x.var_axis(Axis(0), 0.0);
    for (idx, column) in FEATURE_COLUMNS.iter().enumerate() {
        let (mean, variance) = (means[idx], variances[idx]);
        let centered = mean.abs() <= tolerance;
        let unit = (variance - 1.0).abs() <= tolerance || variance.abs() <= tolerance;
        if !(centered && unit) {
            return Err(PipelineError::UnscaledInput {
                column: column.to_string(),
                mean,
                variance,
            });
        }
    }
    Ok(())
}

/// A fitted model with its held-out evaluation.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: LinearRegression,
    pub metrics: MetricsReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Validate, split, fit, and evaluate.
pub fn train(table: &FeatureTable, options: &TrainerOptions) -> Result<TrainedModel, PipelineError> {
    check_standardized(table, options.scale_tolerance)?;
    let split = split_indices(table.len(), options.test_ratio, options.seed)?;
    let train_set = table.select(&split.train);
    let test_set = table.select(&split.test);

    let insufficient = || PipelineError::InsufficientData {
        rows: table.len(),
        train: split.train.len(),
        test: split.test.len(),
    };
    let model = LinearRegression::fit(&train_set.features, &train_set.target)
        .ok_or_else(insufficient)?;
    let predicted = model.predict(&test_set.features);
    let metrics =
        MetricsReport::evaluate(&test_set.target, &predicted).ok_or_else(insufficient)?;

    tracing::debug!(
        train = train_set.len(),
        test = test_set.len(),
        intercept = model.intercept(),
        "Fitted linear regression"
    );
    Ok(TrainedModel {
        model,
        metrics,
        train_rows: train_set.len(),
        test_rows: test_set.len(),
    })
}

/// Summary of a persisted training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub bundle_id: String,
    pub metrics: MetricsReport,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model_path: PathBuf,
}

/// Trains on the persisted table and writes the model and metrics report.
pub struct ModelTrainer {
    processed_table: PathBuf,
    artifacts: ArtifactPaths,
    metrics_path: PathBuf,
    options: TrainerOptions,
    tracker: Box<dyn RunTracker>,
}

impl ModelTrainer {
    pub fn new(paths: &PathsConfig, options: TrainerOptions) -> Self {
        Self {
            processed_table: paths.processed_table.clone(),
            artifacts: ArtifactPaths::in_dir(&paths.artifact_dir),
            metrics_path: paths.metrics.clone(),
            options,
            tracker: Box::new(JsonlRunTracker::new(&paths.runs_log)),
        }
    }

    pub fn with_tracker(mut self, tracker: Box<dyn RunTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// Train on the persisted table and commit the model with the metrics report.
    ///
    /// The model is stamped with the bundle id of the scaler on disk, tying it
    /// to the transforms the table was produced with.
    pub fn run(&mut self) -> Result<TrainOutcome, PipelineError> {
        let table = FeatureTable::read_csv(&self.processed_table)?;
        let scaler: ArtifactEnvelope<StandardScaler> =
            ArtifactEnvelope::read(&self.artifacts.scaler, ArtifactKind::Scaler)?;
        let trained = train(&table, &self.options)?;

        let mut staged = StagedWrite::new();
        self.stage(&trained, &scaler.bundle_id, &mut staged)?;
        staged.commit()?;
        Ok(self.finish(trained, scaler.bundle_id))
    }

    /// Stage the model envelope and the metrics report.
    pub(crate) fn stage(
        &self,
        trained: &TrainedModel,
        bundle_id: &str,
        staged: &mut StagedWrite,
    ) -> Result<(), PipelineError> {
        let model = ArtifactEnvelope::seal(ArtifactKind::Model, bundle_id, trained.model.clone())?;
        staged.add_json(&self.artifacts.model, &model)?;
        staged.add_json(&self.metrics_path, &trained.metrics)?;
        Ok(())
    }

    /// Log and track a committed run.
    pub(crate) fn finish(&mut self, trained: TrainedModel, bundle_id: String) -> TrainOutcome {
        let outcome = TrainOutcome {
            bundle_id,
            metrics: trained.metrics,
            train_rows: trained.train_rows,
            test_rows: trained.test_rows,
            model_path: self.artifacts.model.clone(),
        };
        tracing::info!(
            bundle_id = %outcome.bundle_id,
            rmse = outcome.metrics.rmse,
            mae = outcome.metrics.mae,
            r2 = outcome.metrics.r2,
            train = outcome.train_rows,
            test = outcome.test_rows,
            "Model trained and persisted"
        );

        if let Err(e) = self.track(&outcome) {
            tracing::warn!(error = %e, "Failed to record training run");
        }
        outcome
    }

    fn track(&mut self, outcome: &TrainOutcome) -> Result<(), PipelineError> {
        self.tracker.log_params(&RunParams {
            seed: self.options.seed,
            test_ratio: self.options.test_ratio,
            train_rows: outcome.train_rows,
            test_rows: outcome.test_rows,
        })?;
        self.tracker.log_metrics(&outcome.metrics)?;
        self.tracker.log_model(&ModelRef {
            bundle_id: outcome.bundle_id.clone(),
            path: outcome.model_path.clone(),
        })
    }
}
