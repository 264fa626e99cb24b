use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ScheduleStrategy, TaskId, TaskType};

/// Where a single task currently sits; a `Task` leaving `Pending`/`Running`
/// (completed, parked in `failed`) leaves the queue manager entirely rather
/// than gaining a third status value, matching `spec.md` §3's invariant
/// that a task is in exactly one of the three structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
}

/// A single unit of inference work: one uploaded file, one task type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTask {
    pub task_id: TaskId,
    pub file_path: PathBuf,
    pub client_ip: String,
    pub req_id: String,
    pub task_type: TaskType,
    pub schedule_strategy: ScheduleStrategy,
    pub retry_count: u32,
    pub status: TaskStatus,
}

impl ImageTask {
    pub fn new(
        task_id: TaskId,
        file_path: PathBuf,
        client_ip: String,
        req_id: String,
        task_type: TaskType,
        schedule_strategy: ScheduleStrategy,
    ) -> Self {
        Self {
            task_id,
            file_path,
            client_ip,
            req_id,
            task_type,
            schedule_strategy,
            retry_count: 0,
            status: TaskStatus::Pending,
        }
    }
}
