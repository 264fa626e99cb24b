//! The worker agent's HTTP surface (C10/C11, §6.2) and the `AppState` that
//! wires the collector, registration client, and process supervisor
//! together.

pub mod backend;
pub mod collector;
pub mod config;
pub mod error;
pub mod node_id;
pub mod registration;
mod routes;
pub mod services;
pub mod state;
pub mod supervisor;

pub use error::AgentError;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

/// `/ensure_service`'s loopback guard needs the peer address, so callers
/// must serve this with `into_make_service_with_connect_info::<SocketAddr>()`
/// rather than a plain `into_make_service()`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/usage/device_info", get(routes::device_info))
        .route("/usage/services", get(routes::services))
        .route("/ensure_service", post(routes::ensure_service))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
