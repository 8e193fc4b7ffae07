use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;
use seal_ledger::{Ledger, LedgerResult, PaymentEvent};
use seal_store::ChainStore;
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};

/// Shared ledger handle.
pub type AppState<S> = Arc<Ledger<S>>;

/// Run a ledger call on the blocking pool; appends mine and do file I/O.
async fn blocking<S, T, F>(ledger: AppState<S>, f: F) -> ServerResult<T>
where
    S: ChainStore + 'static,
    T: Send + 'static,
    F: FnOnce(&Ledger<S>) -> LedgerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&ledger))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
) -> Json<Value> {
    let miner = ledger.miner();
    Json(json!({
        "name": "seal-server",
        "version": env!("CARGO_PKG_VERSION"),
        "difficulty": miner.difficulty.zeros(),
        "maxIters": miner.max_iters,
    }))
}

/// `POST /upi/record`
pub async fn record_payment<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
    body: Result<Json<PaymentEvent>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    let event = json_body(body)?;
    let block = blocking(ledger, move |l| l.record_payment(&event)).await?;
    Ok(Json(json!({
        "ok": true,
        "txHash": block.hash,
        "index": block.index,
        "timestamp": block.timestamp,
    })))
}

/// `GET /upi/tx/:hash`
pub async fn get_transaction<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
    Path(hash): Path<String>,
) -> ServerResult<Json<Value>> {
    let block = blocking(ledger, move |l| l.get_block(&hash)).await?;
    Ok(Json(json!({ "ok": true, "block": block })))
}

/// `GET /upi/audit`
pub async fn audit<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
) -> ServerResult<Json<Value>> {
    let view = blocking(ledger, |l| l.audit()).await?;
    Ok(Json(json!({ "ok": true, "audit": view.entries, "length": view.length })))
}

/// `GET /ledger/verify`. Integrity failures are a normal 200 response.
pub async fn verify<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
) -> ServerResult<Json<Value>> {
    let result = blocking(ledger, |l| l.verify_chain()).await?;
    Ok(Json(json!({
        "ok": result.ok,
        "error": result.error,
        "length": result.length,
    })))
}

/// `GET /ledger/verify/full`
pub async fn verify_full<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
) -> ServerResult<Json<Value>> {
    let report = blocking(ledger, |l| l.verify_chain_full()).await?;
    Ok(Json(json!({
        "ok": report.is_valid(),
        "violations": report.violations,
        "length": report.length,
    })))
}

/// `GET /ledger/chain`
pub async fn chain<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
) -> ServerResult<Json<Value>> {
    let chain = blocking(ledger, |l| l.chain()).await?;
    Ok(Json(json!({ "ok": true, "length": chain.len(), "chain": chain })))
}

/// `POST /ledger/blocks` with any JSON value as the block payload.
pub async fn append_block<S: ChainStore + 'static>(
    State(ledger): State<AppState<S>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    let data = json_body(body)?;
    let block = blocking(ledger, move |l| l.add_block(data)).await?;
    Ok(Json(json!({ "ok": true, "block": block })))
}
