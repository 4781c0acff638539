//! Versioned, checksummed artifact files.
//!
//! The encoder, scaler, and model are each wrapped in an [`ArtifactEnvelope`]
//! carrying a format version, the kind of payload, a bundle id shared by all
//! three artifacts of one build, and a SHA-256 checksum of the payload. A
//! loader that sees any mismatch treats the artifact as unavailable.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Current artifact format. Bumped on any incompatible payload change.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const ENCODER_FILE: &str = "label_encoder.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "linear_reg_model.json";

/// Locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub encoder: PathBuf,
    pub scaler: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            encoder: dir.join(ENCODER_FILE),
            scaler: dir.join(SCALER_FILE),
            model: dir.join(MODEL_FILE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Encoder,
    Scaler,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Encoder => "encoder",
            Self::Scaler => "scaler",
            Self::Model => "model",
        };
        f.write_str(name)
    }
}

/// Fresh identifier for a set of transforms and the model trained on them.
pub fn new_bundle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Hex SHA-256 of the compact JSON encoding of `payload`.
pub fn checksum<T: Serialize>(payload: &T) -> Result<String, PipelineError> {
    let bytes = serde_json::to_vec(payload)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// A payload with its provenance and integrity metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub format_version: u32,
    pub kind: ArtifactKind,
    pub bundle_id: String,
    pub created_at: DateTime<Utc>,
    pub checksum: String,
    pub payload: T,
}

impl<T> ArtifactEnvelope<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn seal(kind: ArtifactKind, bundle_id: &str, payload: T) -> Result<Self, PipelineError> {
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind,
            bundle_id: bundle_id.to_string(),
            created_at: Utc::now(),
            checksum: checksum(&payload)?,
            payload,
        })
    }

    /// Check version, kind, and checksum.
    pub fn verify(&self, expected: ArtifactKind) -> Result<(), PipelineError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(PipelineError::artifacts_unavailable(format!(
                "{expected} artifact has format version {}, expected {ARTIFACT_FORMAT_VERSION}",
                self.format_version
            )));
        }
        if self.kind != expected {
            return Err(PipelineError::artifacts_unavailable(format!(
                "expected a {expected} artifact, found a {} artifact",
                self.kind
            )));
        }
        if checksum(&self.payload)? != self.checksum {
            return Err(PipelineError::artifacts_unavailable(format!(
                "{expected} artifact checksum mismatch"
            )));
        }
        Ok(())
    }

    /// Read and verify an envelope. Every failure maps to `ArtifactsUnavailable`.
    pub fn read(path: &Path, expected: ArtifactKind) -> Result<Self, PipelineError> {
        let unavailable = |detail: String| {
            PipelineError::artifacts_unavailable(format!(
                "{expected} artifact at {}: {detail}",
                path.display()
            ))
        };
        let envelope: Self = weathercast_core::persistence::load_json(path)
            .map_err(|e| unavailable(e.to_string()))?
            .ok_or_else(|| unavailable("not found".to_string()))?;
        envelope.verify(expected)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::encoder::CategoricalEncoder;
    use tempfile::TempDir;
    use weathercast_core::persistence::atomic_write_json;

    fn encoder() -> CategoricalEncoder {
        CategoricalEncoder::fit(["Sunny", "Cloudy"]).unwrap()
    }

    #[test]
    fn test_seal_write_read() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let sealed = ArtifactEnvelope::seal(ArtifactKind::Encoder, "b-1", encoder()).unwrap();
        atomic_write_json(&paths.encoder, &sealed).unwrap();

        let loaded: ArtifactEnvelope<CategoricalEncoder> =
            ArtifactEnvelope::read(&paths.encoder, ArtifactKind::Encoder).unwrap();
        assert_eq!(loaded, sealed);
        assert_eq!(loaded.bundle_id, "b-1");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = ArtifactEnvelope::<CategoricalEncoder>::read(
            &dir.path().join(ENCODER_FILE),
            ArtifactKind::Encoder,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactsUnavailable { .. }));
    }

    #[test]
    fn test_tampered_payload_fails_checksum() {
        let mut sealed = ArtifactEnvelope::seal(ArtifactKind::Encoder, "b-1", encoder()).unwrap();
        sealed.payload = CategoricalEncoder::fit(["Sunny", "Cloudy", "Mist"]).unwrap();
        let err = sealed.verify(ArtifactKind::Encoder).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_wrong_kind_and_version_are_rejected() {
        let mut sealed = ArtifactEnvelope::seal(ArtifactKind::Encoder, "b-1", encoder()).unwrap();
        assert!(sealed.verify(ArtifactKind::Scaler).is_err());
        sealed.format_version = ARTIFACT_FORMAT_VERSION + 1;
        assert!(sealed.verify(ArtifactKind::Encoder).is_err());
    }

    #[test]
    fn test_garbage_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SCALER_FILE);
        std::fs::write(&path, "{not json").unwrap();
        let err = ArtifactEnvelope::<CategoricalEncoder>::read(&path, ArtifactKind::Scaler)
            .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactsUnavailable { .. }));
    }
}
