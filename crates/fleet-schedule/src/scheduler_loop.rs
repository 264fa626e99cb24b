use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fleet_model::ImageTask;
use fleet_registry::DeviceRegistry;
use tracing::{info, warn};

use crate::policy::SchedulingPolicy;
use crate::task_queue::TaskQueueManager;

const MAX_RETRIES: u32 = 3;
const DISPATCH_RETRY_SLEEP: Duration = Duration::from_millis(100);
const WORKER_RECV_PORT: u16 = 20810;

/// Single background worker consuming `TaskQueueManager::pop` and
/// dispatching to the node `SchedulingPolicy` selects (§4.6).
///
/// `start` is idempotent: a second call on an already-started loop is a
/// no-op, guarded by `started`.
pub struct SchedulerLoop {
    queue: Arc<TaskQueueManager>,
    registry: Arc<DeviceRegistry>,
    policy: Arc<SchedulingPolicy>,
    http: reqwest::Client,
    started: AtomicBool,
}

impl SchedulerLoop {
    pub fn new(
        queue: Arc<TaskQueueManager>,
        registry: Arc<DeviceRegistry>,
        policy: Arc<SchedulingPolicy>,
    ) -> Self {
        Self {
            queue,
            registry,
            policy,
            http: reqwest::Client::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await });
    }

    async fn run(self: Arc<Self>) {
        loop {
            let queue = Arc::clone(&self.queue);
            let task = tokio::task::spawn_blocking(move || queue.pop())
                .await
                .expect("scheduler loop: pop task panicked");
            self.dispatch_one(task).await;
        }
    }

    async fn dispatch_one(&self, task: ImageTask) {
        let snapshot = self.registry.snapshot();
        let target_id = match self
            .policy
            .select(task.task_type, task.schedule_strategy, &snapshot)
        {
            Ok(id) => id,
            Err(e) => {
                warn!(task_id = %task.task_id, error = %e, "no schedulable node, retrying");
                self.retry_or_fail(task);
                tokio::time::sleep(DISPATCH_RETRY_SLEEP).await;
                return;
            }
        };

        let Some(node) = snapshot.static_info.get(&target_id).cloned() else {
            warn!(task_id = %task.task_id, node = %target_id, "selected node vanished from registry, retrying");
            self.retry_or_fail(task);
            tokio::time::sleep(DISPATCH_RETRY_SLEEP).await;
            return;
        };

        let bytes = match tokio::fs::read(&task.file_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(task_id = %task.task_id, path = %task.file_path.display(), error = %e, "failed to read task payload, retrying");
                self.retry_or_fail(task);
                tokio::time::sleep(DISPATCH_RETRY_SLEEP).await;
                return;
            }
        };

        let pic_info = serde_json::json!({
            "ip": task.client_ip,
            "file_name": task.task_id.as_str(),
            "tasktype": task.task_type,
        });

        let form = reqwest::multipart::Form::new()
            .part(
                "pic_file",
                reqwest::multipart::Part::bytes(bytes).file_name(task.task_id.as_str().to_string()),
            )
            .text("pic_info", pic_info.to_string());

        let url = format!("http://{}:{WORKER_RECV_PORT}/recv_task", node.ip_address);
        match self.http.post(&url).multipart(form).send().await {
            Ok(response) if response.status().is_success() => {
                info!(task_id = %task.task_id, node = %target_id, "dispatched");
                self.queue.add_running(target_id, task);
            }
            Ok(response) => {
                warn!(task_id = %task.task_id, node = %target_id, status = %response.status(), "dispatch rejected, retrying");
                self.retry_or_fail(task);
                tokio::time::sleep(DISPATCH_RETRY_SLEEP).await;
            }
            Err(e) => {
                warn!(task_id = %task.task_id, node = %target_id, error = %e, "dispatch transport error, retrying");
                self.retry_or_fail(task);
                tokio::time::sleep(DISPATCH_RETRY_SLEEP).await;
            }
        }
    }

    fn retry_or_fail(&self, mut task: ImageTask) {
        task.retry_count += 1;
        if task.retry_count > MAX_RETRIES {
            self.queue.move_to_failed(task);
        } else {
            self.queue.push(task, true);
        }
    }
}
