use std::sync::Arc;

use logchain_store::InMemoryBatchStore;
use tokio::net::TcpListener;

use crate::config::NodeConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// LogChain API node.
pub struct LogChainServer {
    config: NodeConfig,
    state: Arc<AppState>,
}

impl LogChainServer {
    /// Connect the ledger and set up an empty batch store.
    pub fn new(config: NodeConfig) -> ServerResult<Self> {
        let ledger = logchain_ledger::connect(&config.ledger)?;
        let store = Arc::new(InMemoryBatchStore::new());
        let state = Arc::new(AppState::new(config.server.clone(), ledger, store));
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.server.bind_addr).await?;
        tracing::info!(
            addr = %self.config.server.bind_addr,
            ledger = %self.config.ledger.endpoint,
            "LogChain server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
