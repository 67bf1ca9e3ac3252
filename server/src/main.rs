#![allow(dead_code)]

mod db_core;
mod error;
mod ingest;
mod model;
mod request_tracing;
mod routes;
mod server_config;
mod testing;

use std::{env, net::SocketAddr};

use axum::{extract::FromRef, Router};
use mimalloc::MiMalloc;
use routes::AppRouter;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::{signal, task::JoinHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Clone, FromRef)]
struct ServerState {
    conn: DatabaseConnection,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL is not set in .env file");
    let mut db_options = ConnectOptions::new(db_url);
    db_options.sqlx_logging(false);

    let conn = Database::connect(db_options)
        .await
        .expect("Database connection failed");

    let state = ServerState { conn };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    let router = AppRouter::create(state);
    run_server(router).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            println!("Cleanups done, shutting down");
        },
        _ = terminate => {
            println!("Cleanups done, shutting down");
        },
    }
}

fn run_server(router: Router) -> JoinHandle<()> {
    tokio::spawn(async {
        // Start the server
        let port = env::var("PORT").unwrap_or("5006".to_string());
        tracing::info!("Probewatch server running on http://0.0.0.0:{}", port);
        // check config
        println!("{}", *server_config::cfg);

        let addr = SocketAddr::from(([0, 0, 0, 0], port.parse::<u16>().unwrap()));
        tracing::debug!("listening on {addr}");
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .unwrap();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_core::prelude::*;
    use crate::testing::common::{setup_test_db, SAMPLE_BATCH};

    pub struct TestServer {
        pub addr: SocketAddr,
        pub state: ServerState,
        shutdown_tx: tokio::sync::oneshot::Sender<()>,
    }

    impl TestServer {
        pub fn url(&self) -> String {
            format!("http://{}", self.addr)
        }

        pub async fn shutdown(self) {
            let _ = self.shutdown_tx.send(());
        }
    }

    async fn setup() -> anyhow::Result<TestServer> {
        let conn = setup_test_db().await;
        let state = ServerState { conn };
        let router = AppRouter::create(state.clone());

        // Bind to port 0 to get a random available port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Ok(TestServer {
            addr,
            state,
            shutdown_tx,
        })
    }

    async fn post_sample_batch(server: &TestServer, client: &reqwest::Client) {
        let res = client
            .post(format!("{}/receive", server.url()))
            .header("content-type", "application/json")
            .body(SAMPLE_BATCH)
            .send()
            .await
            .expect("POST /receive failed");
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn test_server_starts() {
        let server = setup().await.expect("Failed to setup test server");
        let body = reqwest::get(server.url())
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "Probewatch server");
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_receive_sample_batch_end_to_end() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{}/receive", server.url()))
            .header("content-type", "application/json")
            .body(SAMPLE_BATCH)
            .send()
            .await
            .expect("POST /receive failed");
        assert_eq!(res.status(), 200);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["stored"], 5);

        let count = ProbeObservation::find()
            .count(&server.state.conn)
            .await
            .unwrap();
        assert_eq!(count, 5);

        let devices: Vec<String> = client
            .get(format!("{}/devices", server.url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(devices.contains(&"14:2d:27:29:16:f7".to_string()));

        let nodes: Vec<String> = client
            .get(format!("{}/nodes", server.url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(nodes, vec!["AC:86:74:61:4F:C0"]);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_receive_alias_for_original_path() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{}/recieve", server.url()))
            .header("content-type", "application/json")
            .body(SAMPLE_BATCH)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_batch_is_rejected_whole() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();

        // Drop a required field from the middle of the batch.
        let mut doc: serde_json::Value = serde_json::from_str(SAMPLE_BATCH).unwrap();
        doc["probe_requests"][2]
            .as_object_mut()
            .unwrap()
            .remove("mac");

        let res = client
            .post(format!("{}/receive", server.url()))
            .json(&doc)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);

        let count = ProbeObservation::find()
            .count(&server.state.conn)
            .await
            .unwrap();
        assert_eq!(count, 0);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_recent_listing_is_sorted_and_limited() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();
        post_sample_batch(&server, &client).await;

        let observations: Vec<serde_json::Value> = client
            .get(format!("{}/observations", server.url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let last_seen: Vec<i64> = observations
            .iter()
            .map(|o| o["lastSeen"].as_i64().unwrap())
            .collect();
        assert_eq!(
            last_seen,
            vec![1455845820, 1455845819, 1455845817, 1455845811, 1455845809]
        );

        let limited: Vec<serde_json::Value> = client
            .get(format!("{}/observations?limit=2", server.url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let res = client
            .get(format!("{}/observations?limit=0", server.url()))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_filter_without_criteria_returns_empty() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();
        post_sample_batch(&server, &client).await;

        let unfiltered: Vec<serde_json::Value> = client
            .get(format!("{}/observations/filter", server.url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(unfiltered.is_empty());

        let filtered: Vec<serde_json::Value> = client
            .get(format!("{}/observations/filter", server.url()))
            .query(&[("device_mac", "14:2d:27:29:16:f7")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["nodeMac"], "AC:86:74:61:4F:C0");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_signal_series_route() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();
        post_sample_batch(&server, &client).await;

        let series: Vec<serde_json::Value> = client
            .get(format!(
                "{}/devices/14:2d:27:29:16:f7/signal",
                server.url()
            ))
            .query(&[("node_mac", "AC:86:74:61:4F:C0")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0]["timestamp"], 1455845819);
        assert_eq!(series[0]["avgSignal"], -68);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_dwell_time_route() {
        let server = setup().await.expect("Failed to setup test server");
        let client = reqwest::Client::new();
        post_sample_batch(&server, &client).await;

        let res = client
            .get(format!("{}/devices/14:2d:27:29:16:f7/dwell", server.url()))
            .query(&[("window_start", "1455845790"), ("window_end", "1455845800")])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["dwellSeconds"], 23);

        // Window with no sightings is "no data", not zero.
        let res = client
            .get(format!("{}/devices/14:2d:27:29:16:f7/dwell", server.url()))
            .query(&[("window_start", "100"), ("window_end", "200")])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);

        // Inverted windows are caller errors.
        let res = client
            .get(format!("{}/devices/14:2d:27:29:16:f7/dwell", server.url()))
            .query(&[("window_start", "200"), ("window_end", "100")])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);

        server.shutdown().await;
    }
}
