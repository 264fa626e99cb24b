use serde::{Deserialize, Serialize};

use crate::ContainerSpec;

/// The cost triple a profile leaf carries alongside its launch spec.
///
/// Not consumed by the live load-weighted score (see
/// `NodeStatus::load_score`) — an older Z3-based scheduler in the original
/// implementation used it, this one doesn't. See `DESIGN.md`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpectedOverhead {
    pub cpu_usage: f64,
    pub mem_usage: f64,
    pub xpu_usage: f64,
}

/// One `(TaskType, DeviceType)` leaf of the static profile store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub spec: ContainerSpec,
    pub overhead: ExpectedOverhead,
}
