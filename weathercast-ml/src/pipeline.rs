//! Stage orchestration over one resolved configuration.

use crate::data::generator::ObservationGenerator;
use crate::data::raw_store::RawStore;
use crate::error::PipelineError;
use crate::features::builder::{BuildOutcome, FeatureTransformBuilder};
use crate::inference::store::ArtifactStore;
use crate::training::trainer::{ModelTrainer, TrainOutcome, TrainerOptions, train};
use serde::{Deserialize, Serialize};
use weathercast_core::PipelineConfig;
use weathercast_core::persistence::StagedWrite;

/// Result of a combined preprocess + train run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub build: BuildOutcome,
    pub train: TrainOutcome,
}

/// Runs pipeline stages against the paths of one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Paths in `config` are used as given; resolve them first if relative
    /// paths should not depend on the working directory.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn raw_store(&self) -> RawStore {
        RawStore::new(&self.config.paths.raw_table)
    }

    pub fn builder(&self) -> FeatureTransformBuilder {
        FeatureTransformBuilder::new(&self.config.paths)
    }

    pub fn trainer(&self) -> ModelTrainer {
        ModelTrainer::new(&self.config.paths, TrainerOptions::from(&self.config.training))
    }

    /// Append `records` synthetic observations to the raw table.
    pub fn generate(&self, records: usize) -> Result<usize, PipelineError> {
        let mut generator = ObservationGenerator::from_config(&self.config.generator);
        let observations = generator.generate(records);
        self.raw_store().append(&observations)
    }

    pub fn preprocess(&self) -> Result<BuildOutcome, PipelineError> {
        self.builder().run()
    }

    pub fn train(&self) -> Result<TrainOutcome, PipelineError> {
        self.trainer().run()
    }

    /// Build features and train in one go, committing the table, all three
    /// artifacts, and the metrics report together.
    ///
    /// Unlike running the stages separately, a training failure here leaves
    /// the previous artifacts untouched.
    pub fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let builder = self.builder();
        let mut trainer = self.trainer();

        let build = builder.build()?;
        let trained = train(&build.table, trainer.options())?;

        let mut staged = StagedWrite::new();
        let bundle_id = builder.stage(&build, &mut staged)?;
        trainer.stage(&trained, &bundle_id, &mut staged)?;
        staged.commit()?;

        Ok(PipelineOutcome {
            build: builder.finish(&build, bundle_id.clone()),
            train: trainer.finish(trained, bundle_id),
        })
    }

    /// Open a serving store over the configured artifact directory.
    pub fn open_store(&self) -> Result<ArtifactStore, PipelineError> {
        ArtifactStore::open(&self.config.paths.artifact_dir)
    }
}
