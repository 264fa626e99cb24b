use std::path::PathBuf;

use clap::Parser;

/// CLI surface for `fleet-masterd` (§6.4), plus the ambient bind address
/// and logging knobs every binary in this workspace carries.
#[derive(Debug, Parser)]
#[command(author, version, about = "Edge inference fleet gateway")]
pub struct GatewayArgs {
    /// Directory containing `static_info.json`.
    #[arg(short = 'c', long = "config", default_value = "./myapp")]
    pub config_dir: PathBuf,

    /// Upload root. A task's file lives at `<task_dir>/<client_ip>/<filename>`.
    #[arg(short = 't', long = "task", default_value = "./tasks")]
    pub task_dir: PathBuf,

    /// If set, uploaded files are NOT deleted on successful completion.
    #[arg(long = "keep-upload", default_value_t = false)]
    pub keep_upload: bool,

    /// HTTP listen address.
    #[arg(long = "bind", default_value = "0.0.0.0:6666", env = "FLEET_GATEWAY_BIND")]
    pub bind: String,

    #[arg(long = "log-level", default_value = "info", env = "FLEET_LOG_LEVEL")]
    pub log_level: String,

    #[arg(long = "log-format", default_value = "text", env = "FLEET_LOG_FORMAT")]
    pub log_format: String,
}
