use serde::{Deserialize, Serialize};

use crate::Flag;

/// A backend container launch spec for one `(TaskType, DeviceType)` cell of
/// the static profile.
///
/// Field set mirrors the original `ImageInfo` record (container name,
/// image, commands/args, env, binds, device passthroughs, host/container
/// port, tty, network config) one-for-one, renamed to idiomatic
/// `snake_case`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub container_name: String,
    pub image: String,
    #[serde(default)]
    pub cmds: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "Flag::disabled")]
    pub privileged: Flag,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub binds: Vec<String>,
    #[serde(default)]
    pub devices: Vec<String>,
    pub host_port: u16,
    pub container_port: u16,
    #[serde(default = "Flag::disabled")]
    pub tty: Flag,
    #[serde(default)]
    pub network_config: Option<String>,
}
