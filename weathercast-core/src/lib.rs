//! # Weathercast Core
//!
//! Plumbing shared by the Weathercast crates: layered configuration,
//! atomic file persistence, and tracing subscriber setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod persistence;

pub use config::{GeneratorConfig, PathsConfig, PipelineConfig, TrainingConfig, load_config};
pub use error::ConfigError;
