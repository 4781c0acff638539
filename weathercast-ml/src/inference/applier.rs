//! Inference transform applier.
//!
//! Rebuilds the training-time feature vector for a single request, encodes
//! the condition with the persisted encoder, scales with the persisted
//! scaler, and evaluates the model. Pure given a bundle.
//!
//! An unseen condition label is encoded as the fallback class (the first
//! label of the sorted vocabulary) instead of failing the request. This keeps
//! serving available for new labels at the cost of biasing those predictions
//! toward that class; [`Prediction::encoding`] records when it happened.

use crate::data::observation::{Observation, finite};
use crate::error::PipelineError;
use crate::features::calendar::CalendarFeatures;
use crate::features::encoder::Encoded;
use crate::features::schema::FeatureRow;
use crate::inference::bundle::ArtifactBundle;
use crate::training::linear::Regressor;
use serde::{Deserialize, Serialize};

/// A single raw-shaped inference input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub humidity: f64,
    pub wind_kph: f64,
    pub condition: String,
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub day_of_year: u32,
}

impl InferenceRequest {
    /// Check ranges of the calendar fields and finiteness of the readings.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.humidity.is_finite() || !self.wind_kph.is_finite() {
            return Err(PipelineError::invalid_request(
                "humidity and wind_kph must be finite numbers",
            ));
        }
        let ranges = [
            ("hour", self.hour, 0, 23),
            ("day", self.day, 1, 31),
            ("month", self.month, 1, 12),
            ("day_of_year", self.day_of_year, 1, 366),
        ];
        for (field, value, lo, hi) in ranges {
            if !(lo..=hi).contains(&value) {
                return Err(PipelineError::invalid_request(format!(
                    "{field} must be in {lo}..={hi}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Build a request from a raw observation, deriving calendar fields the
    /// same way the feature builder does.
    pub fn from_observation(obs: &Observation) -> Result<Self, PipelineError> {
        let raw = obs
            .timestamp()
            .ok_or_else(|| PipelineError::invalid_request("observation has no timestamp"))?;
        let calendar = CalendarFeatures::parse(raw).ok_or_else(|| {
            PipelineError::invalid_request(format!("unparsable timestamp {raw:?}"))
        })?;
        let missing =
            |field: &str| PipelineError::invalid_request(format!("observation has no {field}"));

        Ok(Self {
            humidity: finite(obs.humidity).ok_or_else(|| missing("humidity"))?,
            wind_kph: finite(obs.wind_kph).ok_or_else(|| missing("wind_kph"))?,
            condition: obs
                .condition_label()
                .ok_or_else(|| missing("condition"))?
                .to_string(),
            hour: calendar.hour,
            day: calendar.day,
            month: calendar.month,
            day_of_year: calendar.day_of_year,
        })
    }
}

/// Serving-layer response shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub prediction: f64,
}

/// A full-precision prediction and how its condition was encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub value: f64,
    pub encoding: Encoded,
    pub bundle_id: String,
}

impl Prediction {
    /// The value rounded to one decimal place, ties to even.
    pub fn display(&self) -> f64 {
        (self.value * 10.0).round_ties_even() / 10.0
    }

    pub fn response(&self) -> InferenceResponse {
        InferenceResponse {
            prediction: self.display(),
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.encoding.is_fallback()
    }
}

/// Apply the bundle's transforms and model to one request.
pub fn apply(
    bundle: &ArtifactBundle,
    request: &InferenceRequest,
) -> Result<Prediction, PipelineError> {
    request.validate()?;

    let label = request.condition.trim();
    let encoding = bundle.encoder().encode(label);
    if encoding.is_fallback() {
        tracing::warn!(
            condition = label,
            fallback = bundle.encoder().fallback_class().unwrap_or_default(),
            "Unseen condition label, using fallback class"
        );
    }

    let row = FeatureRow {
        humidity: request.humidity,
        wind_kph: request.wind_kph,
        hour: request.hour,
        day: request.day,
        month: request.month,
        day_of_year: request.day_of_year,
        weather_condition: encoding.code(),
    }
    .to_vector();
    let scaled = bundle.scaler().transform(&row);
    let value = bundle.model().predict_one(&scaled);

    tracing::debug!(bundle_id = bundle.bundle_id(), value, "Prediction computed");
    Ok(Prediction {
        value,
        encoding,
        bundle_id: bundle.bundle_id().to_string(),
    })
}
