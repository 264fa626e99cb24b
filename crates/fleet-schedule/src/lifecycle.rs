use std::sync::Arc;
use std::time::Duration;

use fleet_containers::ContainerEngine;
use fleet_model::{Node, NodeId, ServiceSlot, ServiceSlotState, SrvInfo, TaskType};
use fleet_registry::DeviceRegistry;

use crate::error::ScheduleError;

const CREATING_POLL_ATTEMPTS: u32 = 10;
const CREATING_POLL_INTERVAL: Duration = Duration::from_secs(1);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const DRAIN_SLEEP: Duration = Duration::from_secs(2);

/// Brings a `ServiceSlot (tt, n)` up on demand and reaps it after an idle
/// period (§4.8). Called from both the hot-start flow and (in the
/// original) an inline dispatch-time proxy path; this build only wires
/// the hot-start caller (the `/schedule` flow dispatches directly to an
/// agent-managed autostart service instead, per §4.11's supervisor
/// model), but the state machine is shared so a future caller can reuse
/// it unchanged.
pub struct ContainerLifecycleController {
    registry: Arc<DeviceRegistry>,
    engine: Arc<dyn ContainerEngine>,
}

impl ContainerLifecycleController {
    pub fn new(registry: Arc<DeviceRegistry>, engine: Arc<dyn ContainerEngine>) -> Self {
        Self { registry, engine }
    }

    pub async fn get_or_create(
        &self,
        task_type: TaskType,
        node: &Node,
        profile: &fleet_model::Profile,
    ) -> Result<SrvInfo, ScheduleError> {
        let node_id = node.global_id;
        let state = self.slot_state(task_type, node_id);

        match state {
            ServiceSlotState::Running => {
                if let Some(info) = self.slot_info(task_type, node_id) {
                    self.arm_idle_timer(task_type, node_id);
                    return Ok(info);
                }
                Err(ScheduleError::SlotBusy {
                    task_type,
                    node: node_id.to_string(),
                    state,
                })
            }
            ServiceSlotState::Creating => self.poll_until_running(task_type, node_id).await,
            ServiceSlotState::Deleting => Err(ScheduleError::SlotBusy {
                task_type,
                node: node_id.to_string(),
                state,
            }),
            ServiceSlotState::NoExist => self.create_and_start(task_type, node, profile).await,
        }
    }

    fn slot_state(&self, task_type: TaskType, node_id: NodeId) -> ServiceSlotState {
        self.registry
            .snapshot()
            .slots
            .get(&task_type)
            .and_then(|by_node| by_node.get(&node_id))
            .map(|slot| slot.state)
            .unwrap_or(ServiceSlotState::NoExist)
    }

    fn slot_info(&self, task_type: TaskType, node_id: NodeId) -> Option<SrvInfo> {
        self.registry
            .snapshot()
            .slots
            .get(&task_type)?
            .get(&node_id)?
            .infos
            .first()
            .cloned()
    }

    async fn create_and_start(
        &self,
        task_type: TaskType,
        node: &Node,
        profile: &fleet_model::Profile,
    ) -> Result<SrvInfo, ScheduleError> {
        let node_id = node.global_id;
        self.set_state(task_type, node_id, ServiceSlotState::Creating, Vec::new());

        let container_id = match self.engine.create(&profile.spec).await {
            Ok(id) if !id.is_empty() => id,
            Ok(_) | Err(_) => {
                self.set_state(task_type, node_id, ServiceSlotState::NoExist, Vec::new());
                return Err(ScheduleError::SlotBusy {
                    task_type,
                    node: node_id.to_string(),
                    state: ServiceSlotState::NoExist,
                });
            }
        };

        if self.engine.start(&container_id).await.is_err() {
            self.set_state(task_type, node_id, ServiceSlotState::NoExist, Vec::new());
            return Err(ScheduleError::SlotBusy {
                task_type,
                node: node_id.to_string(),
                state: ServiceSlotState::NoExist,
            });
        }

        let info = SrvInfo {
            container_id,
            ip: node.ip_address.clone(),
            port: profile.spec.host_port,
        };
        self.set_state(task_type, node_id, ServiceSlotState::Running, vec![info.clone()]);
        self.arm_idle_timer(task_type, node_id);
        Ok(info)
    }

    async fn poll_until_running(
        &self,
        task_type: TaskType,
        node_id: NodeId,
    ) -> Result<SrvInfo, ScheduleError> {
        for _ in 0..CREATING_POLL_ATTEMPTS {
            tokio::time::sleep(CREATING_POLL_INTERVAL).await;
            if self.slot_state(task_type, node_id) == ServiceSlotState::Running {
                if let Some(info) = self.slot_info(task_type, node_id) {
                    return Ok(info);
                }
            }
        }
        Err(ScheduleError::SlotBusy {
            task_type,
            node: node_id.to_string(),
            state: ServiceSlotState::Creating,
        })
    }

    fn set_state(
        &self,
        task_type: TaskType,
        node_id: NodeId,
        state: ServiceSlotState,
        infos: Vec<SrvInfo>,
    ) {
        let _ = self
            .registry
            .update_slot(task_type, node_id, ServiceSlot { state, infos });
    }

    /// Spawn a one-shot task that, after the idle timeout, drains,
    /// removes the container, and transitions the slot back to
    /// `NoExist`. Each call replaces the previous timer for this slot by
    /// simply starting a new task; the stale timer's transition is a
    /// no-op once the slot state has moved on (checked right before each
    /// destructive step).
    fn arm_idle_timer(&self, task_type: TaskType, node_id: NodeId) {
        let registry = Arc::clone(&self.registry);
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            tokio::time::sleep(IDLE_TIMEOUT).await;

            let snapshot = registry.snapshot();
            let Some(slot) = snapshot
                .slots
                .get(&task_type)
                .and_then(|by_node| by_node.get(&node_id))
            else {
                return;
            };
            if slot.state != ServiceSlotState::Running {
                return;
            }
            let Some(info) = slot.infos.first().cloned() else {
                return;
            };

            let _ = registry.update_slot(
                task_type,
                node_id,
                ServiceSlot {
                    state: ServiceSlotState::Deleting,
                    infos: vec![info.clone()],
                },
            );
            tokio::time::sleep(DRAIN_SLEEP).await;
            if let Err(e) = engine.remove(&info.container_id).await {
                tracing::warn!(error = %e, container_id = %info.container_id, "idle reap: remove failed");
            }
            let _ = registry.update_slot(
                task_type,
                node_id,
                ServiceSlot {
                    state: ServiceSlotState::NoExist,
                    infos: Vec::new(),
                },
            );
        });
    }

    /// Iterate every node that has a slot for `task_type` and invoke the
    /// create path for it, returning how many succeeded.
    pub async fn hot_start_all_nodes_for_task_type(
        &self,
        task_type: TaskType,
        nodes: &[(Node, fleet_model::Profile)],
    ) -> usize {
        let mut started = 0;
        for (node, profile) in nodes {
            if self
                .get_or_create(task_type, node, profile)
                .await
                .is_ok()
            {
                started += 1;
            }
        }
        started
    }
}
