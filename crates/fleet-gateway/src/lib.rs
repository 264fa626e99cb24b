//! The master's public HTTP surface (C9, §6.1) plus the `AppState` that
//! wires the registry, queue, scheduler, and lifecycle controller
//! together.

pub mod config;
mod error;
mod routes;
mod state;

pub use error::GatewayError;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register_node", post(routes::register_node))
        .route("/unregister_node", post(routes::unregister_node))
        .route("/schedule", post(routes::schedule))
        .route("/task_completed", post(routes::task_completed))
        .route("/hot_start", post(routes::hot_start))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
