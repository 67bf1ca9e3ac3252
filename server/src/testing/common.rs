use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::db_core::prelude::*;

/// The vendor's documented sample report: one node, five devices.
pub const SAMPLE_BATCH: &str = include_str!("../../testdata/sample_batch.json");

/// In-memory SQLite store carrying the observation schema. A single pooled
/// connection keeps the database alive for the whole test.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let conn = Database::connect(options)
        .await
        .expect("sqlite connection failed");

    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);
    let stmt = schema.create_table_from_entity(ProbeObservation);
    conn.execute(backend.build(&stmt))
        .await
        .expect("schema creation failed");

    conn
}
