use std::sync::Arc;

use seal_ledger::Ledger;
use seal_store::{FileChainStore, Initialization};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// SealChain HTTP server over a file-backed ledger.
pub struct SealServer {
    config: ServerConfig,
    ledger: Arc<Ledger<FileChainStore>>,
}

impl SealServer {
    pub fn new(config: ServerConfig) -> Self {
        let ledger = Arc::new(Ledger::open(config.ledger.clone()));
        Self { config, ledger }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<Ledger<FileChainStore>> {
        &self.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.ledger))
    }

    /// Mint genesis if needed, then serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let ledger = Arc::clone(&self.ledger);
        let initialization = tokio::task::spawn_blocking(move || ledger.initialize())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;
        if initialization != Initialization::Existing {
            tracing::info!(?initialization, "chain store initialized");
        }

        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            chain = %self.config.ledger.store.path.display(),
            difficulty = %self.config.ledger.difficulty,
            "SealChain server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
