use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use fleet_agent::collector::Collector;
use fleet_agent::services::SlaveBackendConfig;
use fleet_agent::supervisor::ProcessSupervisor;
use fleet_agent::{AppState, router};
use fleet_model::{DeviceType, NodeId};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_state() -> Arc<AppState> {
    Arc::new(AppState {
        kind: DeviceType::Rk3588,
        global_id: NodeId::new_v4(),
        collector: Arc::new(Collector::new(
            DeviceType::Rk3588,
            "http://127.0.0.1:1".to_string(),
            false,
            30,
            20,
        )),
        supervisor: Arc::new(ProcessSupervisor::start().await),
        backend_cfg: SlaveBackendConfig::default(),
        supported_services: vec!["YoloV5".to_string()],
        project_root: PathBuf::from("."),
        log_dir: PathBuf::from("./workspace/slave/log"),
        restart_delay: Duration::from_secs(1),
        allow_remote_control: false,
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn with_peer(mut req: Request<Body>, addr: SocketAddr) -> Request<Body> {
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

#[tokio::test]
async fn device_info_reports_success_envelope() {
    let state = test_state().await;
    let app = router(state);

    let response = app
        .oneshot(Request::get("/usage/device_info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "success");
    assert!(parsed["result"]["services"].as_array().is_some());
}

#[tokio::test]
async fn services_reports_empty_running_set_initially() {
    let state = test_state().await;
    let app = router(state);

    let response = app
        .oneshot(Request::get("/usage/services").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["result"]["running_services"], json!([]));
}

#[tokio::test]
async fn ensure_service_rejects_non_loopback_when_remote_control_disabled() {
    let state = test_state().await;
    let app = router(state);

    let body = json!({"service": "yolo"});
    let peer: SocketAddr = "10.0.0.9:5555".parse().unwrap();
    let req = with_peer(
        Request::post("/ensure_service")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        peer,
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ensure_service_rejects_unknown_service_from_loopback() {
    let state = test_state().await;
    let app = router(state);

    let body = json!({"service": "nonexistent"});
    let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();
    let req = with_peer(
        Request::post("/ensure_service")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        peer,
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
