use std::sync::Arc;

use movie_recommender::{
    artifacts::ArtifactLoader,
    config::Config,
    routes::{create_router, AppState},
    services::providers::TmdbProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Artifacts are required to serve anything, so a failed load stops startup
    let loader = ArtifactLoader::new(config.artifact_sources())?;
    let artifacts = loader.load().await?;

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.poster_timeout(),
    )?;

    let state = AppState::from_parts(
        artifacts,
        Arc::new(provider),
        config.tmdb_image_url.clone(),
        config.poster_delay(),
    );

    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
