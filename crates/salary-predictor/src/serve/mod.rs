//! Prediction serving.
//!
//! - [`PredictionService`]: request validation, encoding and prediction
//! - [`PredictionError`]: error taxonomy mapped to HTTP status codes
//! - [`router`]: axum routes over a shared [`AppState`]
//! - [`serve`]: load artifacts, bind, run until Ctrl-C

mod config;
mod error;
mod http;
mod service;

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;

pub use config::{default_concurrency, ServeConfig, DEFAULT_ADDR};
pub use error::PredictionError;
pub use http::{router, AppState};
pub use service::{PredictionResponse, PredictionService};

use crate::artifacts::{ArtifactError, ArtifactStore};

/// Startup and listener failures.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to load artifacts: {0}")]
    Artifacts(#[from] ArtifactError),

    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Load the artifact store and serve HTTP until interrupted.
///
/// Artifacts are loaded before binding: a broken artifact never opens a port.
pub async fn serve(config: ServeConfig) -> Result<(), ServeError> {
    let store = Arc::new(ArtifactStore::load(&config.artifacts)?);
    let state = AppState::new(PredictionService::new(store), config.max_concurrency);

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        max_concurrency = config.max_concurrency,
        "salary prediction service listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
