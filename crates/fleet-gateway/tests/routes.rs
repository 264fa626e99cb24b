use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fleet_containers::{ContainerEngine, ContainerError, ContainerState};
use fleet_gateway::{AppState, router};
use fleet_model::{ContainerSpec, DeviceType, Node};
use fleet_registry::StaticProfileStore;
use serde_json::{Value, json};
use tower::ServiceExt;

struct NoopEngine;

#[async_trait]
impl ContainerEngine for NoopEngine {
    async fn create(&self, _spec: &ContainerSpec) -> Result<String, ContainerError> {
        Ok("container-id".to_string())
    }
    async fn start(&self, _container_id: &str) -> Result<(), ContainerError> {
        Ok(())
    }
    async fn remove(&self, _container_id: &str) -> Result<(), ContainerError> {
        Ok(())
    }
    async fn inspect_state(&self, _container_id: &str) -> Result<ContainerState, ContainerError> {
        Ok(ContainerState::Running)
    }
}

fn empty_profile_store() -> StaticProfileStore {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{}").unwrap();
    StaticProfileStore::load(file.path()).unwrap()
}

fn test_state() -> Arc<AppState> {
    let task_dir = tempfile::tempdir().unwrap().into_path();
    AppState::new(empty_profile_store(), Arc::new(NoopEngine), task_dir, false)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_then_unregister_round_trips() {
    let state = test_state();
    let app = router(Arc::clone(&state));

    let node = json!({
        "type": "RK3588",
        "global_id": uuid::Uuid::new_v4().to_string(),
        "ip_address": "10.0.0.5",
        "agent_port": 20810,
    });

    let response = app
        .clone()
        .oneshot(
            Request::post("/register_node")
                .header("content-type", "application/json")
                .body(Body::from(node.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::post("/unregister_node")
                .header("content-type", "application/json")
                .body(Body::from(node.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unregister_unknown_node_is_404() {
    let state = test_state();
    let app = router(state);

    let node = json!({
        "type": "RK3588",
        "global_id": uuid::Uuid::new_v4().to_string(),
        "ip_address": "10.0.0.5",
        "agent_port": 20810,
    });

    let response = app
        .oneshot(
            Request::post("/unregister_node")
                .header("content-type", "application/json")
                .body(Body::from(node.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schedule_rejects_total_num_mismatch() {
    let state = test_state();
    let app = router(state);

    let body = json!({
        "ip": "10.0.0.1",
        "tasktype": "YoloV5",
        "filenames": ["a.png", "b.png"],
        "total_num": 1,
    });

    let response = app
        .oneshot(
            Request::post("/schedule")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schedule_accepts_single_filename_and_queues() {
    let state = test_state();
    let app = router(Arc::clone(&state));

    let body = json!({"ip": "10.0.0.1", "tasktype": "YoloV5", "filename": "a.png"});

    let response = app
        .oneshot(
            Request::post("/schedule")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(state.queue.pending_len(), 1);
}

#[tokio::test]
async fn task_completed_is_idempotent() {
    let state = test_state();
    let app = router(Arc::clone(&state));

    let node = Node {
        global_id: fleet_model::NodeId::new_v4(),
        kind: DeviceType::Rk3588,
        ip_address: "10.0.0.5".to_string(),
        agent_port: 20810,
        services: None,
    };
    let task = fleet_model::ImageTask::new(
        fleet_model::TaskId::from("img42.png"),
        "/tasks/10.0.0.1/img42.png".into(),
        "10.0.0.1".to_string(),
        "img42.png".to_string(),
        fleet_model::TaskType::YoloV5,
        fleet_model::ScheduleStrategy::Load,
    );
    state.queue.add_running(node.global_id, task);

    let body = json!({
        "task_id": "img42.png",
        "device_id": node.global_id.to_string(),
        "client_ip": "10.0.0.1",
        "status": "success",
    });

    let first = app
        .clone()
        .oneshot(
            Request::post("/task_completed")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let parsed = body_json(first).await;
    assert_eq!(parsed["status"], "ok");

    let second = app
        .oneshot(
            Request::post("/task_completed")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
}
