//! HTTP server initialization.
//!
//! [`serve`] wires the database, embedding provider, and router into a
//! running axum server with graceful shutdown on ctrl-c.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::api::{self, AppState};
use crate::config::VaultConfig;
use crate::db;
use crate::embedding;

/// Shared setup: open DB, create the embedding provider, check for a
/// provider mismatch against the stored vectors.
fn setup_shared_state(config: VaultConfig) -> Result<AppState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    // Stored vectors are only comparable to queries embedded the same way
    match db::migrations::get_embedding_provider(&conn)? {
        Some(stored) if stored != config.embedding.provider => {
            tracing::warn!(
                stored = %stored,
                configured = %config.embedding.provider,
                "embedding provider changed — existing vectors were built with a different provider"
            );
        }
        None => {
            db::migrations::set_embedding_provider(&conn, &config.embedding.provider)?;
        }
        _ => {}
    }

    let provider = embedding::create_provider(&config.embedding)?;
    tracing::info!(provider = %config.embedding.provider, "embedding provider ready");

    Ok(AppState {
        db: Arc::new(Mutex::new(conn)),
        embedding: Arc::from(provider),
        config: Arc::new(config),
    })
}

/// Start the HTTP server and run until ctrl-c.
pub async fn serve(config: VaultConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting NeuroVault server");

    let state = setup_shared_state(config)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
