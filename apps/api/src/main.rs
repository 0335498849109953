mod auth;
mod categories;
mod classification;
mod cmd;
mod config;
mod db;
mod errors;
mod jobs;
mod ml;
mod models;
mod pagination;
mod resumes;
mod routes;
mod state;
mod store;
mod text;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    cmd::run().await
}
