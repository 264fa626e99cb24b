use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fleet_model::{DeviceType, NodeId};

use crate::backend::BackendLauncher;
use crate::collector::Collector;
use crate::services::SlaveBackendConfig;
use crate::supervisor::ProcessSupervisor;

/// Shared state for the agent's HTTP surface (§4.10, §4.11).
pub struct AppState {
    pub kind: DeviceType,
    pub global_id: NodeId,
    pub collector: Arc<Collector>,
    pub supervisor: Arc<ProcessSupervisor>,
    pub backend_cfg: SlaveBackendConfig,
    pub supported_services: Vec<String>,
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
    pub restart_delay: Duration,
    pub allow_remote_control: bool,
}

impl AppState {
    pub fn backend_launcher(&self) -> BackendLauncher<'_> {
        BackendLauncher {
            supervisor: self.supervisor.as_ref(),
            cfg: &self.backend_cfg,
            project_root: &self.project_root,
            log_dir: &self.log_dir,
            restart_delay: self.restart_delay,
        }
    }
}
