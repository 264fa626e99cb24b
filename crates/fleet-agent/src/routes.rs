//! Agent HTTP handlers (§6.2): `GET /usage/device_info`, `GET
//! /usage/services`, `POST /ensure_service`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct DeviceInfoResult {
    mem: f64,
    cpu_used: f64,
    xpu_used: f64,
    net_latency: f64,
    net_bandwidth: f64,
    #[serde(rename = "disconnectTime")]
    disconnect_time: i64,
    #[serde(rename = "reconnectTime")]
    reconnect_time: i64,
    #[serde(rename = "timeWindow")]
    time_window: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<String>>,
}

pub async fn device_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.collector.snapshot();
    let services = if state.supported_services.is_empty() {
        None
    } else {
        Some(state.supported_services.clone())
    };

    debug!(cpu = snap.cpu_used, mem = snap.mem, "serving device_info");
    Json(json!({
        "status": "success",
        "result": DeviceInfoResult {
            mem: snap.mem,
            cpu_used: snap.cpu_used,
            xpu_used: snap.xpu_used,
            net_latency: snap.net_latency,
            net_bandwidth: snap.net_bandwidth,
            disconnect_time: snap.disconnect_time,
            reconnect_time: snap.reconnect_time,
            time_window: snap.time_window,
            services,
        }
    }))
}

pub async fn services(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let running = state.supervisor.running_snapshot();
    Json(json!({
        "status": "success",
        "result": {"running_services": running}
    }))
}

#[derive(Debug, Deserialize)]
pub struct EnsureServiceRequest {
    service: String,
}

fn is_loopback(addr: &SocketAddr) -> bool {
    addr.ip().is_loopback()
}

pub async fn ensure_service(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(req): Json<EnsureServiceRequest>,
) -> impl IntoResponse {
    if !state.allow_remote_control && !is_loopback(&peer) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"status": "error", "msg": "remote control is disabled"})),
        );
    }

    match state.backend_launcher().ensure_started(&req.service).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({"status": "success", "msg": "service ensured"})),
        ),
        Ok(false) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "msg": "failed to start service"})),
        ),
        Err(e) => {
            let status = match &e {
                crate::error::AgentError::UnknownService(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({"status": "error", "msg": e.to_string()})))
        }
    }
}
