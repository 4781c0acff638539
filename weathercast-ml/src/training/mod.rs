//! Model training: seeded split, least-squares fit, held-out metrics, and run
//! tracking.

pub mod linear;
pub mod metrics;
pub mod split;
pub mod tracking;
pub mod trainer;

pub use linear::{LinearRegression, Regressor};
pub use metrics::MetricsReport;
pub use split::{Split, split_indices};
pub use tracking::{JsonlRunTracker, ModelRef, NoopTracker, RunParams, RunRecord, RunTracker};
pub use trainer::{
    ModelTrainer, TrainOutcome, TrainedModel, TrainerOptions, check_standardized, train,
};
