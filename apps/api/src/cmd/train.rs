use anyhow::{Context, Result};

use crate::cmd::TrainArgs;
use crate::config::Config;
use crate::ml::training::{run_training, TrainingOptions};

pub async fn run(args: TrainArgs) -> Result<()> {
    let model_dir = args.model_dir.unwrap_or_else(Config::model_dir_from_env);
    let options = TrainingOptions {
        text_column: args.text_column,
        label_column: args.label_column,
        ..TrainingOptions::default()
    };
    let dataset = args.dataset;
    let report = tokio::task::spawn_blocking(move || run_training(&dataset, &model_dir, &options))
        .await
        .context("training task panicked")?
        .context("training failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
