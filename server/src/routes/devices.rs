use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppJsonResult},
    model::probe_observation::{ProbeObservationCtrl, SignalPoint},
    ServerState,
};

/// # GET /devices
///
/// Directory of every device MAC ever observed.
pub async fn get_device_directory(State(state): State<ServerState>) -> AppJsonResult<Vec<String>> {
    let macs = ProbeObservationCtrl::distinct_device_macs(&state.conn).await?;

    Ok(Json(macs))
}

/// # GET /nodes
///
/// Directory of every reporting node MAC.
pub async fn get_node_directory(State(state): State<ServerState>) -> AppJsonResult<Vec<String>> {
    let macs = ProbeObservationCtrl::distinct_node_macs(&state.conn).await?;

    Ok(Json(macs))
}

/// # GET /devices/:mac/nodes
///
/// Every node that reported the device, one entry per observation row.
pub async fn get_nodes_seen(
    State(state): State<ServerState>,
    Path(mac): Path<String>,
) -> AppJsonResult<Vec<String>> {
    let nodes = ProbeObservationCtrl::nodes_seen_by(&state.conn, &mac).await?;

    Ok(Json(nodes))
}

#[derive(Debug, Deserialize)]
pub struct SignalSeriesQuery {
    pub node_mac: String,
}

/// # GET /devices/:mac/signal?node_mac=
///
/// Chronological (timestamp, avgSignal) series for one (device, node) pair.
/// A dashboard overlays one series per node to chart movement between nodes.
pub async fn get_signal_series(
    State(state): State<ServerState>,
    Path(mac): Path<String>,
    Query(query): Query<SignalSeriesQuery>,
) -> AppJsonResult<Vec<SignalPoint>> {
    let series = ProbeObservationCtrl::signal_series(&state.conn, &mac, &query.node_mac).await?;

    Ok(Json(series))
}

#[derive(Debug, Deserialize)]
pub struct DwellTimeQuery {
    pub window_start: i64,
    pub window_end: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DwellTimeResponse {
    pub device_mac: String,
    pub window_start: i64,
    pub window_end: i64,
    pub dwell_seconds: i64,
}

/// # GET /devices/:mac/dwell?window_start=&window_end=
///
/// Elapsed time between the device's earliest and latest sighting whose
/// window opened inside [window_start, window_end]. Answers 404 when the
/// window holds no observations — no data is not zero dwell.
pub async fn get_dwell_time(
    State(state): State<ServerState>,
    Path(mac): Path<String>,
    Query(query): Query<DwellTimeQuery>,
) -> AppJsonResult<DwellTimeResponse> {
    if query.window_start > query.window_end {
        return Err(AppError::BadRequest(format!(
            "window_start {} is after window_end {}",
            query.window_start, query.window_end
        )));
    }

    let dwell =
        ProbeObservationCtrl::dwell_time(&state.conn, &mac, query.window_start, query.window_end)
            .await?;

    Ok(Json(DwellTimeResponse {
        device_mac: mac,
        window_start: query.window_start,
        window_end: query.window_end,
        dwell_seconds: dwell.num_seconds(),
    }))
}
