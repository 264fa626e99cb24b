use std::path::PathBuf;
use std::sync::Arc;

use fleet_containers::ContainerEngine;
use fleet_registry::{DeviceRegistry, StaticProfileStore};
use fleet_schedule::{ContainerLifecycleController, SchedulerLoop, SchedulingPolicy, TaskQueueManager};

/// Shared state handed to every axum handler.
pub struct AppState {
    pub registry: Arc<DeviceRegistry>,
    pub profiles: Arc<StaticProfileStore>,
    pub queue: Arc<TaskQueueManager>,
    pub policy: Arc<SchedulingPolicy>,
    pub scheduler: Arc<SchedulerLoop>,
    pub lifecycle: Arc<ContainerLifecycleController>,
    pub task_dir: PathBuf,
    pub keep_upload: bool,
}

impl AppState {
    pub fn new(
        profiles: StaticProfileStore,
        engine: Arc<dyn ContainerEngine>,
        task_dir: PathBuf,
        keep_upload: bool,
    ) -> Arc<Self> {
        let registry = Arc::new(DeviceRegistry::new());
        let queue = Arc::new(TaskQueueManager::new());
        let policy = Arc::new(SchedulingPolicy::new());
        let scheduler = Arc::new(SchedulerLoop::new(
            Arc::clone(&queue),
            Arc::clone(&registry),
            Arc::clone(&policy),
        ));
        let lifecycle = Arc::new(ContainerLifecycleController::new(
            Arc::clone(&registry),
            engine,
        ));

        Arc::new(Self {
            registry,
            profiles: Arc::new(profiles),
            queue,
            policy,
            scheduler,
            lifecycle,
            task_dir,
            keep_upload,
        })
    }
}
