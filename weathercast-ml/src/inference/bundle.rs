//! The encoder, scaler, and model loaded as one unit.

use crate::artifact::{ArtifactEnvelope, ArtifactKind, ArtifactPaths};
use crate::error::PipelineError;
use crate::features::encoder::CategoricalEncoder;
use crate::features::scaler::StandardScaler;
use crate::training::linear::LinearRegression;
use chrono::{DateTime, Utc};

/// An immutable, mutually compatible artifact triple.
///
/// Construction checks that all three were produced by the same build and
/// that the scaler and model agree with the fixed feature layout, so a held
/// bundle can be applied without further checks.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    bundle_id: String,
    encoder: CategoricalEncoder,
    scaler: StandardScaler,
    model: LinearRegression,
    loaded_at: DateTime<Utc>,
}

impl ArtifactBundle {
    /// Load and cross-check the three artifacts.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, PipelineError> {
        let encoder: ArtifactEnvelope<CategoricalEncoder> =
            ArtifactEnvelope::read(&paths.encoder, ArtifactKind::Encoder)?;
        let scaler: ArtifactEnvelope<StandardScaler> =
            ArtifactEnvelope::read(&paths.scaler, ArtifactKind::Scaler)?;
        let model: ArtifactEnvelope<LinearRegression> =
            ArtifactEnvelope::read(&paths.model, ArtifactKind::Model)?;

        if encoder.bundle_id != scaler.bundle_id || scaler.bundle_id != model.bundle_id {
            return Err(PipelineError::artifacts_unavailable(format!(
                "artifacts come from different builds (encoder {}, scaler {}, model {})",
                encoder.bundle_id, scaler.bundle_id, model.bundle_id
            )));
        }
        Self::from_parts(encoder.bundle_id, encoder.payload, scaler.payload, model.payload)
    }

    /// Assemble a bundle from in-memory artifacts, validating each.
    pub fn from_parts(
        bundle_id: impl Into<String>,
        encoder: CategoricalEncoder,
        scaler: StandardScaler,
        model: LinearRegression,
    ) -> Result<Self, PipelineError> {
        encoder
            .validate()
            .and_then(|_| scaler.validate())
            .and_then(|_| model.validate())
            .map_err(PipelineError::artifacts_unavailable)?;

        Ok(Self {
            bundle_id: bundle_id.into(),
            encoder,
            scaler,
            model,
            loaded_at: Utc::now(),
        })
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &LinearRegression {
        &self.model
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::FeatureVector;
    use tempfile::TempDir;
    use weathercast_core::persistence::atomic_write_json;

    fn parts() -> (CategoricalEncoder, StandardScaler, LinearRegression) {
        let rows: Vec<FeatureVector> = vec![
            [80.0, 10.0, 9.0, 1.0, 1.0, 1.0, 1.0],
            [60.0, 5.0, 15.0, 1.0, 1.0, 1.0, 0.0],
            [70.0, 7.0, 12.0, 2.0, 1.0, 2.0, 1.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_all(&rows);
        let model = LinearRegression::fit(&scaled, &[30.0, 32.0, 31.0]).unwrap();
        let encoder = CategoricalEncoder::fit(["Sunny", "Cloudy"]).unwrap();
        (encoder, scaler, model)
    }

    fn write_bundle(paths: &ArtifactPaths, ids: [&str; 3]) {
        let (encoder, scaler, model) = parts();
        let e = ArtifactEnvelope::seal(ArtifactKind::Encoder, ids[0], encoder).unwrap();
        let s = ArtifactEnvelope::seal(ArtifactKind::Scaler, ids[1], scaler).unwrap();
        let m = ArtifactEnvelope::seal(ArtifactKind::Model, ids[2], model).unwrap();
        atomic_write_json(&paths.encoder, &e).unwrap();
        atomic_write_json(&paths.scaler, &s).unwrap();
        atomic_write_json(&paths.model, &m).unwrap();
    }

    #[test]
    fn test_load_matching_bundle() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        write_bundle(&paths, ["b-1"; 3]);
        let bundle = ArtifactBundle::load(&paths).unwrap();
        assert_eq!(bundle.bundle_id(), "b-1");
        assert_eq!(bundle.encoder().len(), 2);
    }

    #[test]
    fn test_mixed_bundle_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        write_bundle(&paths, ["b-1", "b-1", "b-2"]);
        let err = ArtifactBundle::load(&paths).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactsUnavailable { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        write_bundle(&paths, ["b-1"; 3]);
        std::fs::remove_file(&paths.model).unwrap();
        let err = ArtifactBundle::load(&paths).unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_from_parts_rejects_invalid_scaler() {
        let (encoder, _, model) = parts();
        let scaler: StandardScaler = serde_json::from_value(serde_json::json!({
            "columns": ["humidity"],
            "mean": [0.0],
            "scale": [1.0],
            "n_samples": 1
        }))
        .unwrap();
        let err = ArtifactBundle::from_parts("b-1", encoder, scaler, model).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactsUnavailable { .. }));
    }
}
