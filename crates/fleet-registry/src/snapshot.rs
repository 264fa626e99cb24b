use std::collections::{HashMap, HashSet};

use fleet_model::{Node, NodeId, NodeStatus, ServiceSlot, TaskType};

/// A point-in-time, owned copy of the registry's four tables.
///
/// `fleet-schedule`'s scheduling policy (C4) is a pure function and must
/// not hold the registry lock while it runs, so `DeviceRegistry::snapshot`
/// clones out of the lock into this type instead of handing out guards.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub static_info: HashMap<NodeId, Node>,
    pub status: HashMap<NodeId, NodeStatus>,
    pub active_services: HashMap<NodeId, HashSet<TaskType>>,
    pub slots: HashMap<TaskType, HashMap<NodeId, ServiceSlot>>,
}

impl RegistrySnapshot {
    /// Sorts `ids` by the raw bytes of each `NodeId`'s UUID so scheduling
    /// order (round-robin cursor indexing, load-score tie-breaking) is
    /// deterministic across calls (§4.4), independent of `HashMap`
    /// iteration order.
    pub fn nodes_sorted_by_id(ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut sorted: Vec<NodeId> = ids.into_iter().collect();
        sorted.sort_by_key(|id| *id.as_uuid().as_bytes());
        sorted
    }
}
