use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppJsonResult},
    ingest::{normalize, ProbeBatch},
    model::probe_observation::ProbeObservationCtrl,
    ServerState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveResponse {
    pub stored: u64,
}

/// # POST /receive
///
/// Ingestion endpoint for controller presence reports. The whole batch is
/// validated before anything is written, and all rows are committed in one
/// transaction, so a duplicate or interrupted POST never leaves partial rows
/// behind.
pub async fn receive_batch(
    State(state): State<ServerState>,
    payload: Result<Json<ProbeBatch>, JsonRejection>,
) -> AppJsonResult<ReceiveResponse> {
    let Json(batch) =
        payload.map_err(|rejection| AppError::MalformedBatch(rejection.body_text()))?;

    let rows = normalize(batch)?;
    let stored = ProbeObservationCtrl::insert_batch(&state.conn, rows).await?;

    Ok(Json(ReceiveResponse { stored }))
}

#[cfg(debug_assertions)]
const SAMPLE_BATCH: &str = include_str!("../../testdata/sample_batch.json");

/// # POST /dev/seed
///
/// Stores the vendor's documented sample report. Dev builds only.
#[cfg(debug_assertions)]
pub async fn seed_sample_batch(
    State(state): State<ServerState>,
) -> AppJsonResult<ReceiveResponse> {
    let batch: ProbeBatch =
        serde_json::from_str(SAMPLE_BATCH).map_err(|e| AppError::MalformedBatch(e.to_string()))?;

    let rows = normalize(batch)?;
    let stored = ProbeObservationCtrl::insert_batch(&state.conn, rows).await?;

    Ok(Json(ReceiveResponse { stored }))
}
