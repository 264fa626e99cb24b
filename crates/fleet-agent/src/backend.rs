//! Ties `services::SlaveBackendConfig` to `supervisor::ProcessSupervisor`:
//! `ensure_backend_started`, matching the original's
//! `EnsureBackendStarted`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::AgentError;
use crate::services::{SlaveBackendConfig, render_placeholders};
use crate::supervisor::{ManagedSpec, ProcessSupervisor};

pub struct BackendLauncher<'a> {
    pub supervisor: &'a ProcessSupervisor,
    pub cfg: &'a SlaveBackendConfig,
    pub project_root: &'a Path,
    pub log_dir: &'a Path,
    pub restart_delay: Duration,
}

impl<'a> BackendLauncher<'a> {
    /// Starts `service_name`'s backend if it isn't already running.
    /// `backend == "local"` (or absent) is a no-op success: the service
    /// is assumed to run embedded in the caller, not as a managed
    /// subprocess.
    pub async fn ensure_started(&self, service_name: &str) -> Result<bool, AgentError> {
        if self.supervisor.is_running(service_name) {
            return Ok(true);
        }

        let entry = self
            .cfg
            .services
            .get(service_name)
            .ok_or_else(|| AgentError::UnknownService(service_name.to_string()))?;

        let backend = entry.backend.clone().unwrap_or_else(|| "local".to_string());
        if backend == "local" {
            return Ok(true);
        }

        let start_cmd = entry
            .start_cmd
            .clone()
            .ok_or_else(|| AgentError::MissingStartCmd(service_name.to_string()))?;

        let input_dir = resolve(
            self.project_root,
            entry
                .input_dir
                .as_deref()
                .unwrap_or(&format!("workspace/slave/data/input/{service_name}")),
        );
        let output_dir = resolve(
            self.project_root,
            entry
                .output_dir
                .as_deref()
                .unwrap_or(&format!("workspace/slave/data/output/{service_name}")),
        );
        let _ = tokio::fs::create_dir_all(&input_dir).await;
        let _ = tokio::fs::create_dir_all(&output_dir).await;

        let rendered = render_placeholders(
            &start_cmd,
            &input_dir.display().to_string(),
            &output_dir.display().to_string(),
            service_name,
        );

        let env = vec![
            ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
            ("SERVICE_NAME".to_string(), service_name.to_string()),
            ("INPUT_DIR".to_string(), input_dir.display().to_string()),
            ("OUTPUT_DIR".to_string(), output_dir.display().to_string()),
        ];

        let log_path = self.log_dir.join(service_name).join("service.log");

        self.supervisor
            .spawn(ManagedSpec {
                name: format!("backend_{service_name}"),
                cmd: rendered,
                env,
                cwd: None,
                log_path,
                restart_delay: self.restart_delay,
            })
            .await;

        warn!(service = service_name, backend, "backend started (managed)");
        Ok(true)
    }
}

fn resolve(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
