use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use seal_ledger::Ledger;
use seal_store::ChainStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router with all SealChain endpoints.
pub fn build_router<S: ChainStore + 'static>(ledger: Arc<Ledger<S>>) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler::<S>))
        .route("/upi/record", post(handler::record_payment::<S>))
        .route("/upi/tx/:hash", get(handler::get_transaction::<S>))
        .route("/upi/audit", get(handler::audit::<S>))
        .route("/ledger/verify", get(handler::verify::<S>))
        .route("/ledger/verify/full", get(handler::verify_full::<S>))
        .route("/ledger/chain", get(handler::chain::<S>))
        .route("/ledger/blocks", post(handler::append_block::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ledger)
}
