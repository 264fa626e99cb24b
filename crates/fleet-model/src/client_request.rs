use serde::{Deserialize, Serialize};

use crate::{ImageTask, ScheduleStrategy, TaskType};

/// A batch of tasks submitted together by one client via `/schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    pub req_id: String,
    pub client_ip: String,
    pub task_type: TaskType,
    pub schedule_strategy: ScheduleStrategy,
    pub total_num: usize,
    pub enqueue_time_ms: i64,
    pub tasks: Vec<ImageTask>,
}
