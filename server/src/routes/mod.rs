mod app_router;
mod devices;
mod ingest;
mod observations;

pub use app_router::AppRouter;
