//! Process supervision (C11, §4.11): `recv_server`, `rst_send`, and
//! on-demand backend services each run under a crash-restart loop —
//! spawn, wait, sleep `restart_delay_sec` on exit, respawn — supervised by
//! a `taskvisor::Supervisor` so the agent gets graceful, signal-driven
//! shutdown for free instead of hand-rolled process-group bookkeeping.
//!
//! Grounded on the original's `ManagedSystemLoop` (fork/waitpid/sleep) and
//! on `tno-exec`'s `ShellRunner`/`ProcRunner` for the taskvisor/
//! `tokio::process` idiom (`TaskFn::arc`, `TaskError::Fatal`/`Fail`,
//! `cancel.cancelled()` racing `child.wait()`).

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskvisor::{Config, ControllerConfig, ControllerSpec, Supervisor, TaskError, TaskFn};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct ManagedSpec {
    pub name: String,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub log_path: PathBuf,
    pub restart_delay: Duration,
}

pub struct ProcessSupervisor {
    sup: Arc<Supervisor>,
    running: Mutex<HashSet<String>>,
}

impl ProcessSupervisor {
    /// Builds and starts the underlying `taskvisor::Supervisor`, waiting
    /// until it reports ready.
    pub async fn start() -> Self {
        let sup = Supervisor::builder(Config::default())
            .with_controller(ControllerConfig::default())
            .with_subscribers(Vec::new())
            .build();

        let runner = Arc::clone(&sup);
        tokio::spawn(async move {
            let _ = runner.run(Vec::new()).await;
        });
        sup.wait_ready().await;

        info!("process supervisor is ready");
        Self {
            sup,
            running: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.lock().unwrap().contains(name)
    }

    pub fn running_snapshot(&self) -> Vec<String> {
        let mut out: Vec<String> = self.running.lock().unwrap().iter().cloned().collect();
        out.sort();
        out
    }

    /// Submits a crash-restart-supervised process to the underlying
    /// `taskvisor::Supervisor`. Idempotent: a second submission for an
    /// already-running name is a no-op.
    pub async fn spawn(&self, spec: ManagedSpec) {
        {
            let mut running = self.running.lock().unwrap();
            if !running.insert(spec.name.clone()) {
                return;
            }
        }

        let name: &'static str = Box::leak(spec.name.clone().into_boxed_str());
        let task = TaskFn::arc(name, move |cancel: CancellationToken| {
            let cmd = spec.cmd.clone();
            let env = spec.env.clone();
            let cwd = spec.cwd.clone();
            let log_path = spec.log_path.clone();
            let restart_delay = spec.restart_delay;
            let task_name = spec.name.clone();
            async move {
                crash_restart_loop(&task_name, &cmd, &env, cwd.as_deref(), &log_path, restart_delay, cancel)
                    .await
            }
        });

        if let Err(e) = self.sup.submit(ControllerSpec::queue(task)).await {
            warn!(error = %e, "failed to submit managed process");
        }
    }
}

/// Spawn/wait/sleep/respawn forever, matching the original's
/// `ManagedSystemLoop`, until `cancel` fires.
async fn crash_restart_loop(
    name: &str,
    cmd: &str,
    env: &[(String, String)],
    cwd: Option<&std::path::Path>,
    log_path: &std::path::Path,
    restart_delay: Duration,
    cancel: CancellationToken,
) -> Result<(), TaskError> {
    loop {
        if cancel.is_cancelled() {
            return Err(TaskError::Canceled);
        }

        info!(name, cmd, "starting managed process");
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        for (k, v) in env {
            command.env(k, v);
        }
        attach_log(&mut command, log_path);

        let mut child = match command.spawn() {
            Ok(c) => c,
            Err(e) => {
                warn!(name, error = %e, "spawn failed, retrying after backoff");
                tokio::time::sleep(restart_delay).await;
                continue;
            }
        };

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| TaskError::Fatal { reason: format!("wait: {e}") })?;
                warn!(name, code = ?status.code(), "managed process exited, restarting after backoff");
                tokio::time::sleep(restart_delay).await;
            }
            _ = cancel.cancelled() => {
                info!(name, "shutting down managed process");
                let _ = child.kill().await;
                return Err(TaskError::Canceled);
            }
        }
    }
}

fn attach_log(command: &mut Command, log_path: &std::path::Path) {
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => match file.try_clone() {
            Ok(second) => {
                command.stdout(Stdio::from(file));
                command.stderr(Stdio::from(second));
            }
            Err(_) => {
                command.stdout(Stdio::from(file));
                command.stderr(Stdio::null());
            }
        },
        Err(e) => {
            warn!(path = %log_path.display(), error = %e, "failed to open log file for managed process");
        }
    }
}
