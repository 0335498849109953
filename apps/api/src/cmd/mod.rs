use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod create_user;
mod migrate;
mod serve;
mod train;

#[derive(Parser)]
#[command(version, about = "Resume upload and classification service")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    /// Run the HTTP API (default)
    Serve,
    /// Apply database migrations
    Migrate,
    /// Train the classifier from a labeled CSV and write its artifacts
    Train(TrainArgs),
    /// Create an account, optionally with staff rights
    CreateUser(CreateUserArgs),
}

#[derive(Args)]
pub struct TrainArgs {
    /// CSV file with one resume per row
    #[arg(long)]
    pub dataset: PathBuf,
    /// Output directory; defaults to MODEL_DIR
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
    #[arg(long, default_value = "Resume_str")]
    pub text_column: String,
    #[arg(long, default_value = "Category")]
    pub label_column: String,
}

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub staff: bool,
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command.unwrap_or(SubCommandType::Serve) {
        SubCommandType::Serve => serve::run().await,
        SubCommandType::Migrate => migrate::apply().await,
        SubCommandType::Train(args) => train::run(args).await,
        SubCommandType::CreateUser(args) => create_user::run(args).await,
    }
}
