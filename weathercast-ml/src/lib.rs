//! # weathercast-ml
//!
//! Temperature regression over periodic weather observations, with the
//! feature transforms fitted at training time reused verbatim at serving
//! time.
//!
//! - [`features`]: calendar features, condition encoder, standard scaler, and
//!   the builder that fits them over the raw table.
//! - [`training`]: seeded split, least-squares model, metrics, run tracking.
//! - [`inference`]: versioned artifact bundle, reloadable store, applier.
//! - [`artifact`]: the checksummed envelope every artifact is persisted in.

pub mod artifact;
pub mod data;
pub mod error;
pub mod features;
pub mod inference;
pub mod pipeline;
pub mod training;

pub use artifact::{ArtifactEnvelope, ArtifactKind, ArtifactPaths};
pub use data::{FeatureTable, Observation, ObservationGenerator, RawStore};
pub use error::{ErrorKind, PipelineError};
pub use features::{
    BuildOutcome, CategoricalEncoder, Encoded, FeatureTransformBuilder, StandardScaler,
    build_features,
};
pub use inference::{
    ArtifactBundle, ArtifactStore, InferenceRequest, InferenceResponse, Prediction, apply,
};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use training::{
    JsonlRunTracker, LinearRegression, MetricsReport, ModelTrainer, NoopTracker, RunTracker,
    TrainOutcome, TrainerOptions,
};
