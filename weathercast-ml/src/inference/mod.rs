//! Inference: the versioned artifact bundle, a reloadable store for serving,
//! and the transform applier.

pub mod applier;
pub mod bundle;
pub mod store;

pub use applier::{InferenceRequest, InferenceResponse, Prediction, apply};
pub use bundle::ArtifactBundle;
pub use store::ArtifactStore;
