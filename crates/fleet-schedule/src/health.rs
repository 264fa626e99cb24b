use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use fleet_model::NodeId;
use fleet_registry::DeviceRegistry;
use tracing::info;

use crate::task_queue::TaskQueueManager;

const SCAN_INTERVAL: Duration = Duration::from_secs(5);
const RECOVERY_COOLDOWN: Duration = Duration::from_secs(30);

/// Scans the registry every 5 s for nodes whose reported latency exceeds
/// the reachability threshold and recovers their in-flight tasks (§4.7),
/// subject to a 30 s per-node cooldown so a node mid-reconnect isn't
/// recovered repeatedly while its latency is still catching up.
pub struct HealthMonitor {
    registry: Arc<DeviceRegistry>,
    queue: Arc<TaskQueueManager>,
    last_recovered: Mutex<HashMap<NodeId, Instant>>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<DeviceRegistry>, queue: Arc<TaskQueueManager>) -> Self {
        Self {
            registry,
            queue,
            last_recovered: Mutex::new(HashMap::new()),
        }
    }

    pub fn spawn(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(SCAN_INTERVAL).await;
                self.tick();
            }
        });
    }

    fn tick(&self) {
        let snapshot = self.registry.snapshot();
        let now = Instant::now();

        let mut to_recover = Vec::new();
        {
            let mut last_recovered = self.last_recovered.lock().expect("health monitor lock poisoned");
            for (node_id, status) in &snapshot.status {
                if !status.is_unreachable() {
                    continue;
                }
                let on_cooldown = last_recovered
                    .get(node_id)
                    .is_some_and(|at| now.duration_since(*at) < RECOVERY_COOLDOWN);
                if on_cooldown {
                    continue;
                }
                last_recovered.insert(*node_id, now);
                to_recover.push(*node_id);
            }
        }

        for node_id in to_recover {
            info!(node = %node_id, "recovering tasks from unreachable node");
            self.queue.recover(node_id);
        }
    }
}
