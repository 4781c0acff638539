//! Feature transforms shared by training and serving.
//!
//! The builder fits the encoder and scaler; the inference applier reuses the
//! same [`schema::FeatureRow`] layout and the persisted transforms so both
//! sides produce identical feature vectors.

pub mod builder;
pub mod calendar;
pub mod encoder;
pub mod scaler;
pub mod schema;

pub use builder::{
    BuildOutcome, BuildReport, FeatureBuild, FeatureTransformBuilder, build_features,
};
pub use calendar::CalendarFeatures;
pub use encoder::{CategoricalEncoder, Encoded};
pub use scaler::StandardScaler;
pub use schema::{
    CONDITION_COLUMN, FEATURE_COLUMNS, FeatureRow, FeatureVector, N_FEATURES, TARGET_COLUMN,
};
