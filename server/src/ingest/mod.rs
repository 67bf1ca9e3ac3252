//! Ingestion of controller presence reports.
//!
//! A controller POSTs one flat JSON document per reporting interval, covering
//! one node and many observed devices. The normalizer turns a batch into
//! pending observation rows; any invalid entry rejects the whole batch, so a
//! retried POST can never leave a partial write behind.

mod batch;
mod normalizer;

pub use batch::{NetworkId, ProbeBatch, ProbeEntry};
pub use normalizer::normalize;
