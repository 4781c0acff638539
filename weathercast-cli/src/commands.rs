//! Subcommand handlers.

use crate::{Commands, ConfigAction};
use std::path::Path;
use weathercast_core::PipelineConfig;
use weathercast_core::config::WORKSPACE_CONFIG_FILE;
use weathercast_ml::Pipeline;
use weathercast_ml::inference::InferenceRequest;

/// Load configuration and resolve its paths against the workspace.
fn load(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let mut config = weathercast_core::load_config(Some(workspace), config_file)
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    config.paths = config.paths.resolve(workspace);
    Ok(config)
}

pub(crate) fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    let pipeline = || load(workspace, config_file).map(Pipeline::new);

    match command {
        Commands::Config { action } => handle_config(action, workspace, config_file)?,
        Commands::Generate { records } => {
            let pipeline = pipeline()?;
            let records = records.unwrap_or(pipeline.config().generator.records);
            let count = pipeline.generate(records)?;
            println!(
                "Appended {} observations to {}",
                count,
                pipeline.config().paths.raw_table.display()
            );
        }
        Commands::Preprocess => {
            let outcome = pipeline()?.preprocess()?;
            println!(
                "Built {} feature rows ({} dropped), vocabulary of {} conditions",
                outcome.report.rows_kept,
                outcome.report.rows_dropped,
                outcome.vocabulary.len()
            );
            println!("Bundle: {}", outcome.bundle_id);
        }
        Commands::Train => {
            let outcome = pipeline()?.train()?;
            print_metrics(&outcome.metrics);
            println!("Bundle: {}", outcome.bundle_id);
        }
        Commands::Run => {
            let outcome = pipeline()?.run()?;
            println!(
                "Built {} feature rows ({} dropped)",
                outcome.build.report.rows_kept, outcome.build.report.rows_dropped
            );
            print_metrics(&outcome.train.metrics);
            println!("Bundle: {}", outcome.train.bundle_id);
        }
        Commands::Predict {
            humidity,
            wind_kph,
            condition,
            hour,
            day,
            month,
            day_of_year,
            json,
        } => {
            let request = InferenceRequest {
                humidity,
                wind_kph,
                condition,
                hour,
                day,
                month,
                day_of_year,
            };
            let prediction = pipeline()?.open_store()?.predict(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&prediction.response())?);
            } else {
                println!("Predicted temperature: {:.1} °C", prediction.display());
                if prediction.used_fallback() {
                    println!(
                        "Note: condition {:?} was not seen in training; the fallback class was used.",
                        request.condition
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_metrics(metrics: &weathercast_ml::MetricsReport) {
    println!(
        "RMSE {:.3}  MAE {:.3}  R² {:.3}",
        metrics.rmse, metrics.mae, metrics.r2
    );
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = weathercast_core::load_config(Some(workspace), config_file)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Init => {
            let path = workspace.join(WORKSPACE_CONFIG_FILE);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            let body = PipelineConfig::default().to_toml()?;
            weathercast_core::persistence::atomic_write(&path, body.as_bytes())?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn predict(json: bool) -> Commands {
        Commands::Predict {
            humidity: 70.0,
            wind_kph: 9.0,
            condition: "Sunny".into(),
            hour: 12,
            day: 5,
            month: 6,
            day_of_year: 156,
            json,
        }
    }

    #[test]
    fn test_config_init_then_show() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let init = Commands::Config {
            action: ConfigAction::Init,
        };
        assert!(handle_command(init, workspace, None).is_ok());
        assert!(workspace.join(WORKSPACE_CONFIG_FILE).exists());

        let again = Commands::Config {
            action: ConfigAction::Init,
        };
        assert!(handle_command(again, workspace, None).is_err());

        let show = Commands::Config {
            action: ConfigAction::Show,
        };
        assert!(handle_command(show, workspace, None).is_ok());
    }

    #[test]
    fn test_predict_without_artifacts_fails() {
        let dir = TempDir::new().unwrap();
        let err = handle_command(predict(false), dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("Artifacts unavailable"));
    }

    #[test]
    fn test_generate_run_predict() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        handle_command(Commands::Generate { records: Some(120) }, workspace, None).unwrap();
        assert!(workspace.join("data/raw/raw_weather_data.csv").exists());

        handle_command(Commands::Run, workspace, None).unwrap();
        assert!(workspace.join("models/linear_reg_model.json").exists());
        assert!(workspace.join("report/metrics.json").exists());

        assert!(handle_command(predict(true), workspace, None).is_ok());
        assert!(handle_command(predict(false), workspace, None).is_ok());
    }

    #[test]
    fn test_explicit_missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let result = handle_command(Commands::Preprocess, dir.path(), Some(&missing));
        assert!(result.is_err());
    }
}
