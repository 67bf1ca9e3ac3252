use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    db_core::prelude::probe_observation,
    error::{AppError, AppJsonResult},
    model::probe_observation::ProbeObservationCtrl,
    ServerState,
};

#[derive(Debug, Deserialize)]
pub struct GetRecentQuery {
    /// Newest-first row cap; must be positive when present.
    pub limit: Option<u64>,
}

/// # GET /observations
///
/// Stored observations, newest `last_seen` first. Without a limit every row
/// is returned.
pub async fn get_recent(
    State(state): State<ServerState>,
    Query(query): Query<GetRecentQuery>,
) -> AppJsonResult<Vec<probe_observation::Model>> {
    if query.limit == Some(0) {
        return Err(AppError::BadRequest(
            "limit must be a positive integer".into(),
        ));
    }

    let observations = ProbeObservationCtrl::list_recent(&state.conn, query.limit).await?;

    Ok(Json(observations))
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub device_mac: Option<String>,
    pub node_mac: Option<String>,
}

/// # GET /observations/filter
///
/// Observations matching a device and/or node MAC. With no criteria this
/// deliberately answers with an empty list instead of scanning the table.
pub async fn get_filtered(
    State(state): State<ServerState>,
    Query(query): Query<FilterQuery>,
) -> AppJsonResult<Vec<probe_observation::Model>> {
    let observations = ProbeObservationCtrl::filter_by(
        &state.conn,
        query.device_mac.as_deref(),
        query.node_mac.as_deref(),
    )
    .await?;

    Ok(Json(observations))
}
