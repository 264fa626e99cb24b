use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use fleet_model::{Node, NodeId, NodeStatus, ServiceSlot, TaskType};

use crate::error::RegistryError;
use crate::profile_store::StaticProfileStore;
use crate::snapshot::RegistrySnapshot;

struct Inner {
    static_info: HashMap<NodeId, Node>,
    status: HashMap<NodeId, NodeStatus>,
    active_services: HashMap<NodeId, HashSet<TaskType>>,
    slots: HashMap<TaskType, HashMap<NodeId, ServiceSlot>>,
}

/// The master's mutable view of the fleet (§4.2): four tables behind a
/// single reader-preferred lock.
///
/// A `std::sync::RwLock` rather than an async lock is deliberate — every
/// critical section here is a short, synchronous table edit, so holding
/// it across an `.await` never happens and the stdlib primitive is the
/// simplest correct choice.
pub struct DeviceRegistry {
    inner: RwLock<Inner>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                static_info: HashMap::new(),
                status: HashMap::new(),
                active_services: HashMap::new(),
                slots: HashMap::new(),
            }),
        }
    }

    /// Register `node`, pre-populating a `ServiceSlot::NoExist` for every
    /// task type the profile store knows about for its device type.
    ///
    /// Idempotent: re-registering an already-known `NodeId` updates its
    /// `ip_address`/`agent_port` and resets its status to "no data" (§4.2),
    /// matching the original's "reset to zero" without reviving the
    /// zero-sentinel representation (see `NodeStatus` doc comment).
    pub fn register(&self, node: Node, profiles: &StaticProfileStore) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        let id = node.global_id;

        for tt in profiles.task_types_for_device(node.kind) {
            inner
                .slots
                .entry(tt)
                .or_default()
                .entry(id)
                .or_insert_with(ServiceSlot::new);
        }

        inner.static_info.insert(id, node);
        inner.status.remove(&id);
    }

    /// Erase `node_id` from all four tables, returning the set of task
    /// types that had a slot for it so the caller (C8) can let any
    /// in-flight idle timers for those slots expire naturally rather than
    /// racing a forced removal.
    pub fn remove(&self, node_id: NodeId) -> Result<HashSet<TaskType>, RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if inner.static_info.remove(&node_id).is_none() {
            return Err(RegistryError::UnknownNode(node_id));
        }
        inner.status.remove(&node_id);
        inner.active_services.remove(&node_id);

        let mut freed = HashSet::new();
        for (tt, by_node) in inner.slots.iter_mut() {
            if by_node.remove(&node_id).is_some() {
                freed.insert(*tt);
            }
        }
        Ok(freed)
    }

    pub fn update_status(&self, node_id: NodeId, status: NodeStatus) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if !inner.static_info.contains_key(&node_id) {
            return Err(RegistryError::UnknownNode(node_id));
        }
        inner.status.insert(node_id, status);
        Ok(())
    }

    pub fn update_active_services(
        &self,
        node_id: NodeId,
        services: HashSet<TaskType>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if !inner.static_info.contains_key(&node_id) {
            return Err(RegistryError::UnknownNode(node_id));
        }
        inner.active_services.insert(node_id, services);
        Ok(())
    }

    pub fn update_slot(
        &self,
        task_type: TaskType,
        node_id: NodeId,
        slot: ServiceSlot,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if !inner.static_info.contains_key(&node_id) {
            return Err(RegistryError::UnknownNode(node_id));
        }
        inner
            .slots
            .entry(task_type)
            .or_default()
            .insert(node_id, slot);
        Ok(())
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.read().expect("registry lock poisoned");
        RegistrySnapshot {
            static_info: inner.static_info.clone(),
            status: inner.status.clone(),
            active_services: inner.active_services.clone(),
            slots: inner.slots.clone(),
        }
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fleet_model::DeviceType;

    use super::*;

    fn node(id: NodeId, kind: DeviceType) -> Node {
        Node {
            global_id: id,
            kind,
            ip_address: "10.0.0.5".to_string(),
            agent_port: 20810,
            services: None,
        }
    }

    fn empty_profile_store() -> StaticProfileStore {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();
        StaticProfileStore::load(file.path()).unwrap()
    }

    #[test]
    fn register_is_idempotent_and_resets_status() {
        let registry = DeviceRegistry::new();
        let profiles = empty_profile_store();
        let id = NodeId::new_v4();

        registry.register(node(id, DeviceType::Rk3588), &profiles);
        registry
            .update_status(
                id,
                NodeStatus {
                    cpu_used: 0.5,
                    mem_used: 0.5,
                    xpu_used: 0.5,
                    net_latency: 1.0,
                    net_bandwidth: 1.0,
                    disconnect_time: 0.0,
                    reconnect_time: 0.0,
                    time_window: 0.0,
                },
            )
            .unwrap();
        assert!(registry.snapshot().status.contains_key(&id));

        // re-register with a new ip; status must reset to "no data"
        let mut updated = node(id, DeviceType::Rk3588);
        updated.ip_address = "10.0.0.6".to_string();
        registry.register(updated, &profiles);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.static_info[&id].ip_address, "10.0.0.6");
        assert!(!snapshot.status.contains_key(&id));
    }

    #[test]
    fn remove_erases_all_tables_and_returns_freed_task_types() {
        let registry = DeviceRegistry::new();
        let profiles = empty_profile_store();
        let id = NodeId::new_v4();
        registry.register(node(id, DeviceType::Rk3588), &profiles);
        registry
            .update_slot(TaskType::YoloV5, id, ServiceSlot::new())
            .unwrap();

        let freed = registry.remove(id).unwrap();
        assert_eq!(freed, HashSet::from([TaskType::YoloV5]));

        let snapshot = registry.snapshot();
        assert!(!snapshot.static_info.contains_key(&id));
        assert!(!snapshot.slots[&TaskType::YoloV5].contains_key(&id));
    }

    #[test]
    fn remove_unknown_node_is_an_error() {
        let registry = DeviceRegistry::new();
        let err = registry.remove(NodeId::new_v4()).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownNode(_)));
    }
}
