use chrono::Duration;
use serde::Serialize;

use crate::{
    db_core::prelude::*,
    error::{AppError, AppResult},
};

pub struct ProbeObservationCtrl;

/// One point of a per-(device, node) signal trend, keyed by the observation
/// window's upper bound.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPoint {
    pub timestamp: i64,
    pub avg_signal: i32,
}

impl ProbeObservationCtrl {
    /// Persists every pending row of one batch, or none of them.
    pub async fn insert_batch(
        conn: &DatabaseConnection,
        rows: Vec<probe_observation::ActiveModel>,
    ) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let stored = rows.len() as u64;

        let txn = conn.begin().await?;
        ProbeObservation::insert_many(rows).exec(&txn).await?;
        txn.commit().await?;

        Ok(stored)
    }

    /// Observations newest-first by `last_seen`; no limit returns all rows.
    pub async fn list_recent(
        conn: &DatabaseConnection,
        limit: Option<u64>,
    ) -> AppResult<Vec<probe_observation::Model>> {
        let mut query =
            ProbeObservation::find().order_by_desc(probe_observation::Column::LastSeen);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        Ok(query.all(conn).await?)
    }

    /// Observations matching a device and/or node MAC. No criteria never
    /// scans the table: the result is empty by contract.
    pub async fn filter_by(
        conn: &DatabaseConnection,
        device_mac: Option<&str>,
        node_mac: Option<&str>,
    ) -> AppResult<Vec<probe_observation::Model>> {
        if device_mac.is_none() && node_mac.is_none() {
            return Ok(Vec::new());
        }

        let mut query = ProbeObservation::find();
        if let Some(mac) = device_mac {
            query = query.filter(probe_observation::Column::DeviceMac.eq(mac));
        }
        if let Some(mac) = node_mac {
            query = query.filter(probe_observation::Column::NodeMac.eq(mac));
        }

        Ok(query.all(conn).await?)
    }

    pub async fn distinct_device_macs(conn: &DatabaseConnection) -> AppResult<Vec<String>> {
        let macs = ProbeObservation::find()
            .select_only()
            .column(probe_observation::Column::DeviceMac)
            .distinct()
            .into_tuple::<String>()
            .all(conn)
            .await?;

        Ok(macs)
    }

    pub async fn distinct_node_macs(conn: &DatabaseConnection) -> AppResult<Vec<String>> {
        let macs = ProbeObservation::find()
            .select_only()
            .column(probe_observation::Column::NodeMac)
            .distinct()
            .into_tuple::<String>()
            .all(conn)
            .await?;

        Ok(macs)
    }

    /// Every node that reported the device, one entry per observation row in
    /// insertion order — not deduplicated, so callers can see how often a
    /// device was picked up where.
    pub async fn nodes_seen_by(
        conn: &DatabaseConnection,
        device_mac: &str,
    ) -> AppResult<Vec<String>> {
        let nodes = ProbeObservation::find()
            .filter(probe_observation::Column::DeviceMac.eq(device_mac))
            .order_by_asc(probe_observation::Column::Id)
            .select_only()
            .column(probe_observation::Column::NodeMac)
            .into_tuple::<String>()
            .all(conn)
            .await?;

        Ok(nodes)
    }

    /// Chronological (last_seen, avg_signal) series for one (device, node)
    /// pair. Callers overlay one series per node to chart movement.
    pub async fn signal_series(
        conn: &DatabaseConnection,
        device_mac: &str,
        node_mac: &str,
    ) -> AppResult<Vec<SignalPoint>> {
        let points = ProbeObservation::find()
            .filter(probe_observation::Column::DeviceMac.eq(device_mac))
            .filter(probe_observation::Column::NodeMac.eq(node_mac))
            .order_by_asc(probe_observation::Column::LastSeen)
            .select_only()
            .column_as(probe_observation::Column::LastSeen, "timestamp")
            .column(probe_observation::Column::AvgSignal)
            .into_model::<SignalPoint>()
            .all(conn)
            .await?;

        Ok(points)
    }

    /// Elapsed time between the device's earliest and latest sighting whose
    /// window opened inside `[window_start, window_end]`: with the matching
    /// rows ordered by `first_seen`, the last row's `last_seen` minus the
    /// first row's `first_seen`. An empty window is `NoObservations`, not
    /// zero dwell.
    pub async fn dwell_time(
        conn: &DatabaseConnection,
        device_mac: &str,
        window_start: i64,
        window_end: i64,
    ) -> AppResult<Duration> {
        let rows = ProbeObservation::find()
            .filter(probe_observation::Column::DeviceMac.eq(device_mac))
            .filter(probe_observation::Column::FirstSeen.gte(window_start))
            .filter(probe_observation::Column::FirstSeen.lte(window_end))
            .order_by_asc(probe_observation::Column::FirstSeen)
            .all(conn)
            .await?;

        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => Ok(Duration::seconds(last.last_seen - first.first_seen)),
            _ => Err(AppError::NoObservations),
        }
    }
}
