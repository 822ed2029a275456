//! MLOps CLI
//!
//! `train` fits and exports the model, `evaluate` prints the saved metrics,
//! `export` prints the path of the exported model file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mlops_core::constants;
use mlops_core::logic::config::TrainingConfig;
use mlops_core::logic::training;

#[derive(Parser)]
#[command(name = "mlops")]
#[command(about = "Breast cancer classifier training pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train, evaluate and export the model
    Train {
        /// YAML training configuration
        #[arg(short, long, default_value = constants::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Print the metrics written by the last training run
    Evaluate {
        #[arg(short, long, default_value = constants::DEFAULT_METRICS_FILE)]
        metrics_file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the path of the exported model file
    Export {
        #[arg(short, long, default_value = constants::DEFAULT_MODEL_DIR)]
        model_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { config } => {
            let mut config = TrainingConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            config.apply_env_overrides();
            log::info!("Config: {:?}", config);

            let outcome = training::run(config).await?;
            let scores = outcome.evaluation.scores;
            println!("accuracy:  {:.4}", scores.accuracy);
            println!("precision: {:.4}", scores.precision);
            println!("recall:    {:.4}", scores.recall);
            println!("f1_score:  {:.4}", scores.f1_score);
            println!("roc_auc:   {:.4}", scores.roc_auc);
            println!("model:     {}", outcome.artifacts.model.display());
            if let Some(run_id) = outcome.run_id {
                println!("run_id:    {}", run_id);
            }
        }

        Commands::Evaluate { metrics_file, json } => {
            let metrics = training::evaluate_saved(&metrics_file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                for (key, value) in &metrics {
                    println!("{}: {}", key, value);
                }
            }
        }

        Commands::Export { model_dir } => {
            let path = training::export_model(&model_dir)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
