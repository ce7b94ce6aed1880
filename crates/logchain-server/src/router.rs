use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all LogChain endpoints.
///
/// CORS is permissive: the dashboard is served from another origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/batches", post(handler::create_batch).get(handler::list_batches))
        .route("/batches/:id", get(handler::get_batch))
        .route("/batches/:id/anchor", post(handler::anchor_batch))
        .route("/batches/:id/verify", get(handler::verify_batch))
        .route("/onchain/total", get(handler::onchain_total))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
