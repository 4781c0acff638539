//! Error types for the weathercast-ml crate.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pipeline operations.
///
/// Every failure an orchestrator may want to branch on has its own variant;
/// use [`PipelineError::kind`] to match without destructuring.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Required column missing from raw table: {column}")]
    MissingColumn { column: String },

    #[error("Malformed timestamp at row {row}: {value:?}")]
    MalformedTimestamp { row: usize, value: String },

    #[error("No rows left after cleaning ({rows_read} rows read)")]
    EmptyAfterCleaning { rows_read: usize },

    #[error("Unscaled input: column {column} has mean {mean:.6} and variance {variance:.6}")]
    UnscaledInput {
        column: String,
        mean: f64,
        variance: f64,
    },

    #[error("Insufficient data: {rows} rows split into {train} train / {test} test")]
    InsufficientData {
        rows: usize,
        train: usize,
        test: usize,
    },

    #[error("Artifacts unavailable: {reason}")]
    ArtifactsUnavailable { reason: String },

    #[error("Schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid inference request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Discriminant of [`PipelineError`] for routing retry/abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceNotFound,
    MissingColumn,
    MalformedTimestamp,
    EmptyAfterCleaning,
    UnscaledInput,
    InsufficientData,
    ArtifactsUnavailable,
    SchemaMismatch,
    InvalidRequest,
    Io,
    Csv,
    Serde,
}

impl PipelineError {
    pub fn artifacts_unavailable(reason: impl Into<String>) -> Self {
        Self::ArtifactsUnavailable {
            reason: reason.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::MissingColumn { .. } => ErrorKind::MissingColumn,
            Self::MalformedTimestamp { .. } => ErrorKind::MalformedTimestamp,
            Self::EmptyAfterCleaning { .. } => ErrorKind::EmptyAfterCleaning,
            Self::UnscaledInput { .. } => ErrorKind::UnscaledInput,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::ArtifactsUnavailable { .. } => ErrorKind::ArtifactsUnavailable,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Io(_) => ErrorKind::Io,
            Self::Csv(_) => ErrorKind::Csv,
            Self::Serde(_) => ErrorKind::Serde,
        }
    }

    /// Whether retrying the same call later can succeed without changing inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ArtifactsUnavailable | ErrorKind::Io)
    }
}
