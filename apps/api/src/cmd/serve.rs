use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::db::create_pool;
use crate::ml::classifier::ResumeClassifier;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    // unreadable artifacts abort startup; missing ones leave the model unloaded
    let classifier = ResumeClassifier::load(&config.model_dir)
        .with_context(|| format!("failed to load model from {}", config.model_dir.display()))?;

    std::fs::create_dir_all(&config.media_dir)
        .with_context(|| format!("cannot create media dir {}", config.media_dir.display()))?;

    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        classifier: Arc::new(classifier),
        config: Arc::new(config.clone()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
