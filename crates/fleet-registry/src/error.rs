use fleet_model::{DeviceType, NodeId, TaskType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read static info file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse static info file {path}: {source}")]
    ParseFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no profile registered for task type {task_type} on device {device_type}")]
    UnknownProfile {
        task_type: TaskType,
        device_type: DeviceType,
    },

    #[error("node {0} is already registered")]
    AlreadyRegistered(NodeId),

    #[error("node {0} is not registered")]
    UnknownNode(NodeId),
}
