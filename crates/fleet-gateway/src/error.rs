use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error(transparent)]
    Registry(#[from] fleet_registry::RegistryError),

    #[error(transparent)]
    Schedule(#[from] fleet_schedule::ScheduleError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Maps onto the InputValidation/NotFound kinds of §7: 400 with
/// `{status:"error", msg}` for validation failures, 404 with the same
/// shape for unknown nodes, 500 for anything else.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            GatewayError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::NodeNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            GatewayError::Registry(fleet_registry::RegistryError::UnknownNode(id)) => {
                (StatusCode::NOT_FOUND, format!("unknown node: {id}"))
            }
            GatewayError::Registry(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            GatewayError::Schedule(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            GatewayError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        (status, Json(json!({"status": "error", "msg": msg}))).into_response()
    }
}
