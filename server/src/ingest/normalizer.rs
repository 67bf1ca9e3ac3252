use sea_orm::ActiveValue;

use crate::{
    db_core::prelude::probe_observation,
    error::{AppError, AppResult},
    server_config::cfg,
};

use super::batch::{ProbeBatch, ProbeEntry};

/// Turns one controller batch into pending observation rows.
///
/// Entry order is preserved and nothing is deduplicated against existing
/// rows: repeated sightings accumulate as history. The first invalid entry
/// rejects the whole batch with `MalformedBatch`.
pub fn normalize(batch: ProbeBatch) -> AppResult<Vec<probe_observation::ActiveModel>> {
    let network_id = batch.network_id.into_string();
    if network_id.is_empty() {
        return Err(AppError::MalformedBatch("network_id is empty".into()));
    }
    if batch.node_mac.is_empty() {
        return Err(AppError::MalformedBatch("node_mac is empty".into()));
    }
    if batch.probe_requests.len() > cfg.ingest.max_batch_entries {
        return Err(AppError::MalformedBatch(format!(
            "batch has {} entries, limit is {}",
            batch.probe_requests.len(),
            cfg.ingest.max_batch_entries
        )));
    }

    let mut rows = Vec::with_capacity(batch.probe_requests.len());
    for (idx, entry) in batch.probe_requests.into_iter().enumerate() {
        validate_entry(idx, &entry)?;
        rows.push(probe_observation::ActiveModel {
            id: ActiveValue::NotSet,
            network_id: ActiveValue::Set(network_id.clone()),
            node_mac: ActiveValue::Set(batch.node_mac.clone()),
            device_mac: ActiveValue::Set(entry.mac),
            count: ActiveValue::Set(entry.count),
            min_signal: ActiveValue::Set(entry.min_signal),
            max_signal: ActiveValue::Set(entry.max_signal),
            avg_signal: ActiveValue::Set(entry.avg_signal),
            first_seen: ActiveValue::Set(entry.first_seen),
            last_seen: ActiveValue::Set(entry.last_seen),
            associated: ActiveValue::Set(entry.associated),
        });
    }

    Ok(rows)
}

fn validate_entry(idx: usize, entry: &ProbeEntry) -> AppResult<()> {
    if entry.mac.is_empty() {
        return Err(malformed(idx, "mac is empty".into()));
    }
    if entry.count < 1 {
        return Err(malformed(
            idx,
            format!("count {} is not positive", entry.count),
        ));
    }
    if entry.min_signal > entry.avg_signal || entry.avg_signal > entry.max_signal {
        return Err(malformed(
            idx,
            format!(
                "signal readings out of order: min {} avg {} max {}",
                entry.min_signal, entry.avg_signal, entry.max_signal
            ),
        ));
    }
    if entry.first_seen < 0 || entry.last_seen < 0 {
        return Err(malformed(
            idx,
            format!(
                "negative timestamps: first_seen {} last_seen {}",
                entry.first_seen, entry.last_seen
            ),
        ));
    }
    if entry.first_seen > entry.last_seen {
        return Err(malformed(
            idx,
            format!(
                "first_seen {} is after last_seen {}",
                entry.first_seen, entry.last_seen
            ),
        ));
    }

    Ok(())
}

fn malformed(idx: usize, detail: String) -> AppError {
    AppError::MalformedBatch(format!("probe_requests[{}]: {}", idx, detail))
}
