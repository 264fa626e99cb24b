use serde::{Deserialize, Serialize};

/// A running backend instance inside a `ServiceSlot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrvInfo {
    pub container_id: String,
    pub ip: String,
    pub port: u16,
}

/// State machine for a per-`(TaskType, NodeId)` container slot.
///
/// Valid transition sequence (per-slot): `NoExist -> Creating ->
/// (Running)+ -> Deleting -> NoExist`, matching `spec.md` §8 invariant 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceSlotState {
    NoExist,
    Creating,
    Running,
    Deleting,
}

/// A slot's full state: its lifecycle stage plus the service instance(s)
/// backing it once `Running`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSlot {
    pub state: ServiceSlotState,
    pub infos: Vec<SrvInfo>,
}

impl ServiceSlot {
    pub fn new() -> Self {
        Self {
            state: ServiceSlotState::NoExist,
            infos: Vec::new(),
        }
    }
}

impl Default for ServiceSlot {
    fn default() -> Self {
        Self::new()
    }
}
