use fleet_model::TaskType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no schedulable node for task type {0}")]
    NoSchedulableNode(TaskType),

    #[error("failed to read task payload {path}: {source}")]
    ReadPayload {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dispatch to {node} failed: {reason}")]
    Dispatch { node: String, reason: String },

    #[error(transparent)]
    Container(#[from] fleet_containers::ContainerError),

    #[error("service slot for ({task_type}, {node}) is busy (state={state:?})")]
    SlotBusy {
        task_type: TaskType,
        node: String,
        state: fleet_model::ServiceSlotState,
    },

    #[error(transparent)]
    Registry(#[from] fleet_registry::RegistryError),
}
