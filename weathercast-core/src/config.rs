//! Configuration system for Weathercast.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit config file -> environment.
//! Configuration is loaded from `~/.config/weathercast/config.toml` and/or
//! `weathercast.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the workspace-local configuration file.
pub const WORKSPACE_CONFIG_FILE: &str = "weathercast.toml";

/// Prefix for environment overrides (`WEATHERCAST_TRAINING__SEED=7`).
pub const ENV_PREFIX: &str = "WEATHERCAST_";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Where tables, artifacts, and reports live.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Split and validation settings for the trainer.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Synthetic observation generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// File locations used by each pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Append-only raw observation table.
    #[serde(default = "default_raw_table")]
    pub raw_table: PathBuf,
    /// Transformed feature table written by the builder.
    #[serde(default = "default_processed_table")]
    pub processed_table: PathBuf,
    /// Directory holding the encoder, scaler, and model artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    /// Latest metrics report.
    #[serde(default = "default_metrics")]
    pub metrics: PathBuf,
    /// JSON-lines log of training runs.
    #[serde(default = "default_runs_log")]
    pub runs_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_table: default_raw_table(),
            processed_table: default_processed_table(),
            artifact_dir: default_artifact_dir(),
            metrics: default_metrics(),
            runs_log: default_runs_log(),
        }
    }
}

impl PathsConfig {
    /// Resolve every relative path against `workspace`.
    pub fn resolve(&self, workspace: &Path) -> Self {
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                workspace.join(p)
            }
        };
        Self {
            raw_table: join(&self.raw_table),
            processed_table: join(&self.processed_table),
            artifact_dir: join(&self.artifact_dir),
            metrics: join(&self.metrics),
            runs_log: join(&self.runs_log),
        }
    }
}

fn default_raw_table() -> PathBuf {
    PathBuf::from("data/raw/raw_weather_data.csv")
}

fn default_processed_table() -> PathBuf {
    PathBuf::from("data/processed/processed_weather_data.csv")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_metrics() -> PathBuf {
    PathBuf::from("report/metrics.json")
}

fn default_runs_log() -> PathBuf {
    PathBuf::from("report/runs.jsonl")
}

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation.
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Seed for the train/test shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Allowed deviation of feature mean/variance from a standardized column.
    #[serde(default = "default_scale_tolerance")]
    pub scale_tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: default_test_ratio(),
            seed: default_seed(),
            scale_tolerance: default_scale_tolerance(),
        }
    }
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_scale_tolerance() -> f64 {
    1e-6
}

/// Synthetic observation generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of observations to generate.
    #[serde(default = "default_records")]
    pub records: usize,
    /// City name stamped on every observation.
    #[serde(default = "default_city")]
    pub city: String,
    /// Fixed seed; entropy-seeded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            records: default_records(),
            city: default_city(),
            seed: None,
        }
    }
}

fn default_records() -> usize {
    1000
}

fn default_city() -> String {
    "Jakarta".to_string()
}

impl PipelineConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.training.test_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(ConfigError::invalid(format!(
                "training.test_ratio must be in (0, 1), got {ratio}"
            )));
        }
        let tolerance = self.training.scale_tolerance;
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(ConfigError::invalid(
                "training.scale_tolerance must be positive",
            ));
        }
        if self.generator.city.trim().is_empty() {
            return Err(ConfigError::invalid("generator.city must not be empty"));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `WEATHERCAST_`, `__` for nesting)
/// 2. Explicit config file (must exist when given)
/// 3. Workspace-local config (`weathercast.toml`)
/// 4. User config (`~/.config/weathercast/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<PipelineConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    // User-level config
    if let Some(dirs) = directories::ProjectDirs::from("dev", "weathercast", "weathercast") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(WORKSPACE_CONFIG_FILE);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: PipelineConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    tracing::debug!(?config, "Loaded pipeline configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_pipeline_layout() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.paths.raw_table,
            PathBuf::from("data/raw/raw_weather_data.csv")
        );
        assert_eq!(config.paths.artifact_dir, PathBuf::from("models"));
        assert_eq!(config.training.test_ratio, 0.2);
        assert_eq!(config.training.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_workspace_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(WORKSPACE_CONFIG_FILE),
            "[training]\nseed = 7\n\n[paths]\nartifact_dir = \"artifacts\"\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.test_ratio, 0.2);
        assert_eq!(config.paths.artifact_dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(None, Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.toml");
        std::fs::write(&file, "[training]\ntest_ratio = 1.5\n").unwrap();
        let err = load_config(None, Some(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let mut paths = PathsConfig::default();
        let abs = std::env::temp_dir().join("metrics.json");
        paths.metrics = abs.clone();
        let resolved = paths.resolve(Path::new("/work"));
        assert_eq!(resolved.metrics, abs);
        assert_eq!(
            resolved.processed_table,
            Path::new("/work").join("data/processed/processed_weather_data.csv")
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = PipelineConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: PipelineConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
