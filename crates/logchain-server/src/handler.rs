use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use logchain_store::BatchQuery;
use logchain_types::{BatchId, BatchRecord};
use tracing::info;

use crate::dto::{
    AnchorResponse, BatchResponse, CreateBatchRequest, HealthResponse, ListParams, TotalResponse,
    VerifyResponse,
};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

type AppStateRef = State<Arc<AppState>>;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn create_batch(
    State(state): AppStateRef,
    Json(request): Json<CreateBatchRequest>,
) -> ServerResult<Json<BatchResponse>> {
    let record = request.into_record()?;
    state.store.insert(record.clone())?;
    info!(
        batch = %record.id(),
        device = record.device_id().unwrap_or("-"),
        fingerprint = %record.fingerprint(),
        "batch submitted"
    );
    Ok(Json(BatchResponse::from(&record)))
}

pub async fn list_batches(
    State(state): AppStateRef,
    Query(params): Query<ListParams>,
) -> ServerResult<Json<Vec<BatchResponse>>> {
    let query = BatchQuery {
        device_id: params.device_id,
        user_id: params.user_id,
        anchored: params.anchored,
        skip: params.skip,
        limit: state.config.page_size(params.limit),
    };
    let records = state.store.list(&query)?;
    Ok(Json(records.iter().map(BatchResponse::from).collect()))
}

pub async fn get_batch(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ServerResult<Json<BatchResponse>> {
    let record = load(&state, &id)?;
    Ok(Json(BatchResponse::from(&record)))
}

pub async fn anchor_batch(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ServerResult<Json<AnchorResponse>> {
    let record = load(&state, &id)?;
    let outcome = state.coordinator.anchor(&record).await?;
    Ok(Json(AnchorResponse::from(outcome)))
}

pub async fn verify_batch(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> ServerResult<Json<VerifyResponse>> {
    let record = load(&state, &id)?;
    let result = state.verify(&record).await?;
    Ok(Json(VerifyResponse::new(&record, result)))
}

pub async fn onchain_total(State(state): AppStateRef) -> ServerResult<Json<TotalResponse>> {
    let total_batches = state.ledger.count().await?;
    Ok(Json(TotalResponse { total_batches }))
}

fn load(state: &AppState, id: &str) -> ServerResult<BatchRecord> {
    let id: BatchId = id.parse()?;
    state
        .store
        .get(&id)?
        .ok_or_else(|| ServerError::NotFound(format!("batch {id}")))
}
