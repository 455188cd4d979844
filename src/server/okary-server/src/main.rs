//! Okary Server - Main entry point.

mod bootstrap;
mod config;

use std::sync::Arc;

use clap::Parser;
use okary_api::{router, AppState, Catalog};
use okary_auth::TokenCodec;
use okary_storage_fs::FsImageStore;
use okary_storage_sqlite::SqliteBackend;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Okary server...");
    tracing::info!("Bind address: {}", cli.bind);

    if cli.dev {
        tracing::warn!("Development mode enabled - DO NOT USE IN PRODUCTION");
    }

    cli.validate()?;
    let token_config = cli.token_config()?;

    let backend = Arc::new(SqliteBackend::open(&cli.data_dir, &cli.database).await?);
    if let Some(admin) = cli.admin_bootstrap() {
        bootstrap::ensure_admin(backend.as_ref(), &admin).await?;
    }

    let images = Arc::new(FsImageStore::new(cli.images_root()));
    tracing::info!("Image directory: {}", images.root().display());
    let codec = Arc::new(TokenCodec::new(&token_config));
    let state = AppState::new(Catalog::from_backend(backend), codec, images)?;
    let app = router(state, &cli.graphql_path);

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        graphql = %cli.graphql_path,
        "Okary server started successfully"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
