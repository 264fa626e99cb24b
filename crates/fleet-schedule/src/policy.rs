use std::sync::atomic::{AtomicUsize, Ordering};

use fleet_model::{NodeId, ScheduleStrategy, TaskType};
use fleet_registry::RegistrySnapshot;

use crate::error::ScheduleError;

/// Pure candidate-selection logic over a `RegistrySnapshot` (§4.4). Never
/// mutates the registry; the only mutable state it owns is the
/// round-robin cursor, which the spec requires to persist across calls
/// and be globally ordered.
pub struct SchedulingPolicy {
    rr_cursor: AtomicUsize,
}

impl SchedulingPolicy {
    pub fn new() -> Self {
        Self {
            rr_cursor: AtomicUsize::new(0),
        }
    }

    pub fn select(
        &self,
        task_type: TaskType,
        strategy: ScheduleStrategy,
        snapshot: &RegistrySnapshot,
    ) -> Result<NodeId, ScheduleError> {
        let candidates = candidate_set(task_type, snapshot);
        if candidates.is_empty() {
            return Err(ScheduleError::NoSchedulableNode(task_type));
        }

        match strategy {
            ScheduleStrategy::Load => Ok(select_load(&candidates, snapshot)
                .unwrap_or_else(|| self.select_round_robin(&candidates))),
            ScheduleStrategy::RoundRobin => Ok(self.select_round_robin(&candidates)),
        }
    }

    fn select_round_robin(&self, candidates: &[NodeId]) -> NodeId {
        let idx = self.rr_cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        candidates[idx]
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidate set construction (§4.4):
/// 1. nodes with `task_type` in `active_services`,
/// 2. else nodes with a `ServiceSlot` for `(task_type, n)` that also have
///    a status entry,
/// 3. else every node with a status entry (last resort).
///
/// Each branch is sorted by `NodeId` bytes before it is returned so the
/// round-robin cursor indexes a stable list and load-score tie-breaking is
/// deterministic, regardless of `HashMap` iteration order (§4.4, §8).
fn candidate_set(task_type: TaskType, snapshot: &RegistrySnapshot) -> Vec<NodeId> {
    let active = snapshot
        .active_services
        .iter()
        .filter(|(_, services)| services.contains(&task_type))
        .map(|(id, _)| *id);
    let active = RegistrySnapshot::nodes_sorted_by_id(active);
    if !active.is_empty() {
        return active;
    }

    if let Some(by_node) = snapshot.slots.get(&task_type) {
        let with_slot = by_node
            .keys()
            .filter(|id| snapshot.status.contains_key(id))
            .copied();
        let with_slot = RegistrySnapshot::nodes_sorted_by_id(with_slot);
        if !with_slot.is_empty() {
            return with_slot;
        }
    }

    RegistrySnapshot::nodes_sorted_by_id(snapshot.status.keys().copied())
}

/// Minimum-score selection among candidates that have a status entry.
/// Returns `None` (triggering the round-robin fallback) if no candidate
/// has one.
fn select_load(candidates: &[NodeId], snapshot: &RegistrySnapshot) -> Option<NodeId> {
    candidates
        .iter()
        .filter_map(|id| snapshot.status.get(id).map(|s| (*id, s.load_score())))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fleet_model::NodeStatus;

    use super::*;

    fn status(cpu: f64, mem: f64, xpu: f64, bw: f64, lat: f64) -> NodeStatus {
        NodeStatus {
            cpu_used: cpu,
            mem_used: mem,
            xpu_used: xpu,
            net_latency: lat,
            net_bandwidth: bw,
            disconnect_time: 0.0,
            reconnect_time: 0.0,
            time_window: 0.0,
        }
    }

    #[test]
    fn s1_load_based_picks_lower_score() {
        let n1 = NodeId::new_v4();
        let n2 = NodeId::new_v4();

        let mut snapshot = RegistrySnapshot::default();
        snapshot.status.insert(n1, status(0.10, 0.20, 0.05, 100.0, 5.0));
        snapshot.status.insert(n2, status(0.40, 0.30, 0.20, 100.0, 5.0));
        snapshot
            .active_services
            .insert(n1, HashSet::from([TaskType::YoloV5]));
        snapshot
            .active_services
            .insert(n2, HashSet::from([TaskType::YoloV5]));

        let policy = SchedulingPolicy::new();
        let chosen = policy
            .select(TaskType::YoloV5, ScheduleStrategy::Load, &snapshot)
            .unwrap();
        assert_eq!(chosen, n1);
    }

    #[test]
    fn s2_round_robin_visits_each_candidate_once_per_cycle() {
        let mut n1 = NodeId::new_v4();
        let mut n2 = NodeId::new_v4();
        if n1.as_uuid() > n2.as_uuid() {
            std::mem::swap(&mut n1, &mut n2);
        }

        let mut snapshot = RegistrySnapshot::default();
        snapshot.active_services.insert(n1, HashSet::from([TaskType::YoloV5]));
        snapshot.active_services.insert(n2, HashSet::from([TaskType::YoloV5]));

        let policy = SchedulingPolicy::new();
        let picks: Vec<NodeId> = (0..3)
            .map(|_| {
                policy
                    .select(TaskType::YoloV5, ScheduleStrategy::RoundRobin, &snapshot)
                    .unwrap()
            })
            .collect();
        assert_eq!(picks, vec![n1, n2, n1]);
    }

    #[test]
    fn empty_candidate_set_is_no_schedulable_node() {
        let snapshot = RegistrySnapshot::default();
        let policy = SchedulingPolicy::new();
        let err = policy
            .select(TaskType::Bert, ScheduleStrategy::Load, &snapshot)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::NoSchedulableNode(TaskType::Bert)));
    }

    #[test]
    fn load_without_any_status_falls_back_to_round_robin() {
        let node = NodeId::new_v4();
        let mut snapshot = RegistrySnapshot::default();
        snapshot
            .active_services
            .insert(node, HashSet::from([TaskType::YoloV5]));

        let policy = SchedulingPolicy::new();
        let chosen = policy
            .select(TaskType::YoloV5, ScheduleStrategy::Load, &snapshot)
            .unwrap();
        assert_eq!(chosen, node);
    }

    #[test]
    fn candidate_set_falls_back_to_every_node_with_status() {
        let node = NodeId::new_v4();
        let mut snapshot = RegistrySnapshot::default();
        snapshot.status.insert(node, status(0.1, 0.1, 0.1, 10.0, 1.0));

        let candidates = candidate_set(TaskType::Bert, &snapshot);
        assert_eq!(candidates, vec![node]);
    }
}
