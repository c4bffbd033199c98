// Semascope - sperm motility analysis service

pub mod config;
pub mod gateway;
pub mod history;
pub mod models;
pub mod routes;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
