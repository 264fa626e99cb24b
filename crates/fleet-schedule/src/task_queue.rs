use std::collections::{HashMap, VecDeque};
use std::sync::{Condvar, Mutex};

use fleet_model::{ImageTask, NodeId, TaskId, TaskStatus};

const MAX_RETRIES: u32 = 3;

struct Inner {
    pending: VecDeque<ImageTask>,
    running: HashMap<NodeId, Vec<ImageTask>>,
    failed: Vec<ImageTask>,
}

/// The pending/running/failed task store (§4.5).
///
/// Uses `std::sync::Mutex` + `Condvar` rather than an async channel: `Pop`
/// is specified as a blocking wait, and a single dedicated scheduler
/// thread is the only caller, so there is no benefit to an async queue
/// here — callers that need this from async code run it on a
/// `tokio::task::spawn_blocking` thread.
pub struct TaskQueueManager {
    inner: Mutex<Inner>,
    not_empty: Condvar,
}

impl TaskQueueManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                running: HashMap::new(),
                failed: Vec::new(),
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Enqueue `task`. High-priority pushes go to the front (used for
    /// retries); normal submissions go to the back.
    pub fn push(&self, task: ImageTask, high_priority: bool) {
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        if high_priority {
            inner.pending.push_front(task);
        } else {
            inner.pending.push_back(task);
        }
        self.not_empty.notify_one();
    }

    /// Block until a task is available, then return it.
    pub fn pop(&self) -> ImageTask {
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        loop {
            if let Some(task) = inner.pending.pop_front() {
                return task;
            }
            inner = self
                .not_empty
                .wait(inner)
                .expect("task queue lock poisoned");
        }
    }

    pub fn add_running(&self, node_id: NodeId, mut task: ImageTask) {
        task.status = TaskStatus::Running;
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        inner.running.entry(node_id).or_default().push(task);
    }

    /// Remove and return the running task whose id matches `reported_id`
    /// exactly or by path-stem (`"foo.png"` and `"foo"` both complete a
    /// task stored as the other). `None` is a normal outcome for a late
    /// or duplicate completion.
    pub fn complete(&self, reported_id: &TaskId) -> Option<ImageTask> {
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        for tasks in inner.running.values_mut() {
            if let Some(pos) = tasks
                .iter()
                .position(|t| t.task_id == *reported_id || t.task_id.stem() == reported_id.stem())
            {
                return Some(tasks.remove(pos));
            }
        }
        None
    }

    /// Move every task running on `node_id` back to the front of
    /// `pending` (in original order) after incrementing its retry count,
    /// or to `failed` if that exceeds `MAX_RETRIES`.
    pub fn recover(&self, node_id: NodeId) {
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        let Some(tasks) = inner.running.remove(&node_id) else {
            return;
        };
        for mut task in tasks.into_iter().rev() {
            task.retry_count += 1;
            task.status = TaskStatus::Pending;
            if task.retry_count > MAX_RETRIES {
                inner.failed.push(task);
            } else {
                inner.pending.push_front(task);
            }
        }
        self.not_empty.notify_all();
    }

    pub fn move_to_failed(&self, task: ImageTask) {
        let mut inner = self.inner.lock().expect("task queue lock poisoned");
        inner.failed.push(task);
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().expect("task queue lock poisoned").pending.len()
    }

    pub fn running_len(&self, node_id: &NodeId) -> usize {
        self.inner
            .lock()
            .expect("task queue lock poisoned")
            .running
            .get(node_id)
            .map_or(0, Vec::len)
    }

    pub fn failed_len(&self) -> usize {
        self.inner.lock().expect("task queue lock poisoned").failed.len()
    }
}

impl Default for TaskQueueManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use fleet_model::{ScheduleStrategy, TaskType};

    use super::*;

    fn task(id: &str) -> ImageTask {
        ImageTask::new(
            TaskId::from(id),
            format!("/tasks/10.0.0.1/{id}").into(),
            "10.0.0.1".to_string(),
            id.to_string(),
            TaskType::YoloV5,
            ScheduleStrategy::Load,
        )
    }

    #[test]
    fn pop_blocks_until_push() {
        let queue = std::sync::Arc::new(TaskQueueManager::new());
        let q2 = std::sync::Arc::clone(&queue);
        let handle = std::thread::spawn(move || q2.pop());

        std::thread::sleep(std::time::Duration::from_millis(50));
        queue.push(task("a.png"), false);

        let popped = handle.join().unwrap();
        assert_eq!(popped.task_id, TaskId::from("a.png"));
    }

    #[test]
    fn complete_matches_by_path_stem() {
        let queue = TaskQueueManager::new();
        let node = NodeId::new_v4();
        queue.add_running(node, task("foo.png"));

        let completed = queue.complete(&TaskId::from("foo")).unwrap();
        assert_eq!(completed.task_id, TaskId::from("foo.png"));
        assert_eq!(queue.running_len(&node), 0);
    }

    #[test]
    fn complete_is_idempotent() {
        let queue = TaskQueueManager::new();
        let node = NodeId::new_v4();
        queue.add_running(node, task("img42.png"));

        assert!(queue.complete(&TaskId::from("img42.png")).is_some());
        assert!(queue.complete(&TaskId::from("img42.png")).is_none());
    }

    #[test]
    fn recover_requeues_to_front_with_incremented_retry_and_caps_at_max() {
        let queue = TaskQueueManager::new();
        let node = NodeId::new_v4();

        let mut near_cap = task("t1");
        near_cap.retry_count = 3;
        queue.add_running(node, near_cap);
        queue.add_running(node, task("t2"));

        queue.recover(node);

        assert_eq!(queue.running_len(&node), 0);
        assert_eq!(queue.failed_len(), 1);
        assert_eq!(queue.pending_len(), 1);

        let requeued = queue.pop();
        assert_eq!(requeued.task_id, TaskId::from("t2"));
        assert_eq!(requeued.retry_count, 1);
    }
}
