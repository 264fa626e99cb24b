use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use fleet_model::{ImageTask, Node, ScheduleStrategy, TaskId, TaskType};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::state::AppState;

pub async fn register_node(
    State(state): State<Arc<AppState>>,
    Json(node): Json<Node>,
) -> Result<impl IntoResponse, GatewayError> {
    let node_id = node.global_id;
    state.registry.register(node, &state.profiles);
    info!(node = %node_id, "node registered");
    Ok((StatusCode::OK, "registered"))
}

pub async fn unregister_node(
    State(state): State<Arc<AppState>>,
    Json(node): Json<Node>,
) -> Result<impl IntoResponse, GatewayError> {
    let node_id = node.global_id;
    state.registry.remove(node_id)?;
    state.queue.recover(node_id);
    info!(node = %node_id, "node unregistered");
    Ok(Json(json!({"status": "ok", "msg": "unregistered"})))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default, rename = "stargety")]
    strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    ip: String,
    tasktype: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    filenames: Option<Vec<String>>,
    #[serde(default)]
    total_num: Option<usize>,
    #[serde(default)]
    req_id: Option<String>,
}

pub async fn schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
    Json(body): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let strategy = match &query.strategy {
        Some(s) => s
            .parse::<ScheduleStrategy>()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?,
        None => ScheduleStrategy::default(),
    };

    let task_type = body
        .tasktype
        .parse::<TaskType>()
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    let filenames: Vec<String> = match (&body.filename, &body.filenames) {
        (Some(f), None) => vec![f.clone()],
        (None, Some(fs)) if !fs.is_empty() => fs.clone(),
        _ => {
            return Err(GatewayError::InvalidRequest(
                "exactly one of filename/filenames must be present and non-empty".to_string(),
            ));
        }
    };

    if let Some(total_num) = body.total_num {
        if total_num != filenames.len() {
            return Err(GatewayError::InvalidRequest(format!(
                "total_num ({total_num}) does not match filename count ({})",
                filenames.len()
            )));
        }
    }

    let req_id = body
        .req_id
        .clone()
        .unwrap_or_else(|| filenames[0].clone());

    let tasks: Vec<ImageTask> = filenames
        .iter()
        .map(|filename| {
            let path = state.task_dir.join(&body.ip).join(filename);
            ImageTask::new(
                TaskId::from(filename.as_str()),
                path,
                body.ip.clone(),
                req_id.clone(),
                task_type,
                strategy,
            )
        })
        .collect();

    for task in tasks {
        state.queue.push(task, false);
    }

    info!(ip = %body.ip, tasktype = %task_type, count = filenames.len(), "request queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"status": "queued", "msg": format!("{} task(s) queued", filenames.len())})),
    ))
}

#[derive(Debug, Deserialize)]
pub struct TaskCompletedRequest {
    task_id: String,
    #[serde(default)]
    #[allow(dead_code)]
    device_id: Option<String>,
    client_ip: String,
    status: String,
}

pub async fn task_completed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TaskCompletedRequest>,
) -> impl IntoResponse {
    if body.status != "success" {
        warn!(task_id = %body.task_id, status = %body.status, "non-success task completion acknowledged");
        return Json(json!({"status": "ok", "msg": "acknowledged"}));
    }

    let task_id = TaskId::from(body.task_id.as_str());
    match state.queue.complete(&task_id) {
        Some(task) if !state.keep_upload => {
            let path = state.task_dir.join(&body.client_ip).join(task.task_id.as_str());
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "failed to delete completed upload");
            }
        }
        _ => {}
    }

    Json(json!({"status": "ok", "msg": "completed"}))
}

#[derive(Debug, Deserialize)]
pub struct HotStartQuery {
    taskid: String,
}

pub async fn hot_start(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HotStartQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let task_type = query
        .taskid
        .parse::<TaskType>()
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

    let snapshot = state.registry.snapshot();
    let mut nodes = Vec::new();
    if let Some(by_node) = snapshot.slots.get(&task_type) {
        for node_id in by_node.keys() {
            let Some(node) = snapshot.static_info.get(node_id) else {
                continue;
            };
            if let Ok(profile) = state.profiles.profile(task_type, node.kind) {
                nodes.push((node.clone(), profile.clone()));
            }
        }
    }

    let started = state
        .lifecycle
        .hot_start_all_nodes_for_task_type(task_type, &nodes)
        .await;

    Ok((StatusCode::OK, format!("hot-started {started}/{} node(s)", nodes.len())))
}
