use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use http::HeaderValue;
use tower_http::cors::CorsLayer;

use crate::{request_tracing, server_config::cfg, ServerState};

use super::{devices, ingest, observations};

pub struct AppRouter;

impl AppRouter {
    pub fn create(state: ServerState) -> Router {
        let origins = cfg
            .cors
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>().expect("invalid CORS origin"))
            .collect::<Vec<_>>();

        let cors_layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true);

        let router = Router::new()
            .route("/", get(|| async { "Probewatch server" }))
            .route("/receive", post(ingest::receive_batch))
            // Controllers in the field still POST the original misspelled path.
            .route("/recieve", post(ingest::receive_batch))
            .nest(
                "/observations",
                Router::new()
                    .route("/", get(observations::get_recent))
                    .route("/filter", get(observations::get_filtered))
                    .with_state(state.clone()),
            )
            .route("/nodes", get(devices::get_node_directory))
            .nest(
                "/devices",
                Router::new()
                    .route("/", get(devices::get_device_directory))
                    .route("/:mac/nodes", get(devices::get_nodes_seen))
                    .route("/:mac/signal", get(devices::get_signal_series))
                    .route("/:mac/dwell", get(devices::get_dwell_time))
                    .with_state(state.clone()),
            )
            .layer(request_tracing::trace_with_request_id_layer())
            .layer(cors_layer)
            .with_state(state.clone())
            .fallback(handler_404);

        #[cfg(debug_assertions)]
        let router = router.route(
            "/dev/seed",
            post(ingest::seed_sample_batch).with_state(state.clone()),
        );

        router
    }
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route does not exist")
}
