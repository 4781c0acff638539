//! Feature transform builder.
//!
//! Reads the raw observation table, derives calendar features, drops
//! incomplete rows, fits the condition encoder and the standard scaler, and
//! persists the transformed table together with both transform artifacts.

use crate::artifact::{ArtifactEnvelope, ArtifactKind, ArtifactPaths, new_bundle_id};
use crate::data::observation::{Observation, finite};
use crate::data::raw_store::RawStore;
use crate::data::table::FeatureTable;
use crate::error::PipelineError;
use crate::features::calendar::CalendarFeatures;
use crate::features::encoder::CategoricalEncoder;
use crate::features::scaler::StandardScaler;
use crate::features::schema::FeatureRow;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use weathercast_core::PathsConfig;
use weathercast_core::persistence::StagedWrite;

/// Row accounting for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_kept: usize,
}

/// In-memory result of a build: the table and the two fitted transforms.
#[derive(Debug, Clone)]
pub struct FeatureBuild {
    pub table: FeatureTable,
    pub encoder: CategoricalEncoder,
    pub scaler: StandardScaler,
    pub report: BuildReport,
}

/// A row that survived cleaning, before encoding.
struct CleanRow<'a> {
    calendar: CalendarFeatures,
    humidity: f64,
    wind_kph: f64,
    condition: &'a str,
    target: f64,
}

fn complete_row(calendar: Option<CalendarFeatures>, obs: &Observation) -> Option<CleanRow<'_>> {
    Some(CleanRow {
        calendar: calendar?,
        humidity: finite(obs.humidity)?,
        wind_kph: finite(obs.wind_kph)?,
        condition: obs.condition_label()?,
        target: finite(obs.temp_c)?,
    })
}

fn clean_row(row: usize, obs: &Observation) -> Result<Option<CleanRow<'_>>, PipelineError> {
    let calendar = match obs.timestamp() {
        None => None,
        Some(raw) => Some(CalendarFeatures::parse(raw).ok_or_else(|| {
            PipelineError::MalformedTimestamp {
                row,
                value: raw.to_string(),
            }
        })?),
    };
    Ok(complete_row(calendar, obs))
}

/// Run the transform pipeline over raw observations.
///
/// Rows with a missing cell among the model columns are dropped silently
/// (the count is reported). A non-empty timestamp that does not parse fails
/// the whole build. `row` numbers in errors are 1-based data rows.
pub fn build_features(observations: &[Observation]) -> Result<FeatureBuild, PipelineError> {
    let mut kept = Vec::with_capacity(observations.len());
    for (idx, obs) in observations.iter().enumerate() {
        if let Some(row) = clean_row(idx + 1, obs)? {
            kept.push(row);
        }
    }

    let report = BuildReport {
        rows_read: observations.len(),
        rows_dropped: observations.len() - kept.len(),
        rows_kept: kept.len(),
    };
    if report.rows_dropped > 0 {
        tracing::warn!(
            dropped = report.rows_dropped,
            read = report.rows_read,
            "Dropped incomplete observations"
        );
    }

    let encoder = CategoricalEncoder::fit(kept.iter().map(|r| r.condition)).ok_or(
        PipelineError::EmptyAfterCleaning {
            rows_read: report.rows_read,
        },
    )?;

    let mut encoded = Vec::with_capacity(kept.len());
    let mut target = Vec::with_capacity(kept.len());
    for row in &kept {
        // Fitted over these very labels, so every lookup is a hit.
        let code = encoder.encode(row.condition).code();
        encoded.push(
            FeatureRow {
                humidity: row.humidity,
                wind_kph: row.wind_kph,
                hour: row.calendar.hour,
                day: row.calendar.day,
                month: row.calendar.month,
                day_of_year: row.calendar.day_of_year,
                weather_condition: code,
            }
            .to_vector(),
        );
        target.push(row.target);
    }

    let scaler = StandardScaler::fit(&encoded).ok_or(PipelineError::EmptyAfterCleaning {
        rows_read: report.rows_read,
    })?;
    let table = FeatureTable::new(scaler.transform_all(&encoded), target);

    tracing::debug!(
        rows = table.len(),
        vocabulary = encoder.len(),
        "Fitted condition encoder and standard scaler"
    );
    Ok(FeatureBuild {
        table,
        encoder,
        scaler,
        report,
    })
}

/// Summary of a persisted build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub bundle_id: String,
    pub report: BuildReport,
    pub vocabulary: Vec<String>,
    pub processed_table: PathBuf,
}

/// Reads the raw store and persists the transformed table plus the encoder
/// and scaler artifacts as one staged commit.
#[derive(Debug, Clone)]
pub struct FeatureTransformBuilder {
    raw: RawStore,
    processed_table: PathBuf,
    artifacts: ArtifactPaths,
}

impl FeatureTransformBuilder {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            raw: RawStore::new(&paths.raw_table),
            processed_table: paths.processed_table.clone(),
            artifacts: ArtifactPaths::in_dir(&paths.artifact_dir),
        }
    }

    /// Load the raw table and build features without persisting anything.
    pub fn build(&self) -> Result<FeatureBuild, PipelineError> {
        let raw = self.raw.read_all()?;
        if raw.is_empty() {
            return Err(PipelineError::EmptyAfterCleaning { rows_read: 0 });
        }
        raw.require_columns()?;
        build_features(&raw.observations)
    }

    /// Stage the table, encoder, and scaler of `build` under a fresh bundle id.
    pub(crate) fn stage(
        &self,
        build: &FeatureBuild,
        staged: &mut StagedWrite,
    ) -> Result<String, PipelineError> {
        let bundle_id = new_bundle_id();
        let encoder =
            ArtifactEnvelope::seal(ArtifactKind::Encoder, &bundle_id, build.encoder.clone())?;
        let scaler = ArtifactEnvelope::seal(ArtifactKind::Scaler, &bundle_id, build.scaler.clone())?;

        staged.add(&self.processed_table, build.table.to_csv_bytes()?);
        staged.add_json(&self.artifacts.encoder, &encoder)?;
        staged.add_json(&self.artifacts.scaler, &scaler)?;
        Ok(bundle_id)
    }

    /// Build and persist. Nothing is written unless every output is ready.
    pub fn run(&self) -> Result<BuildOutcome, PipelineError> {
        let build = self.build()?;
        let mut staged = StagedWrite::new();
        let bundle_id = self.stage(&build, &mut staged)?;
        staged.commit()?;
        Ok(self.finish(&build, bundle_id))
    }

    /// Log and summarize a committed build.
    pub(crate) fn finish(&self, build: &FeatureBuild, bundle_id: String) -> BuildOutcome {
        tracing::info!(
            bundle_id = %bundle_id,
            rows = build.report.rows_kept,
            dropped = build.report.rows_dropped,
            vocabulary = build.encoder.len(),
            path = %self.processed_table.display(),
            "Feature transforms fitted and persisted"
        );
        BuildOutcome {
            bundle_id,
            report: build.report,
            vocabulary: build.encoder.classes().to_vec(),
            processed_table: self.processed_table.clone(),
        }
    }

    pub fn artifacts(&self) -> &ArtifactPaths {
        &self.artifacts
    }
}
