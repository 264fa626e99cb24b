use serde::{Deserialize, Serialize};

/// Dynamic load snapshot reported by an agent's `/usage/device_info`.
///
/// Absence of a `NodeStatus` for a node (not a zero-valued one) is how the
/// registry represents "no successful poll yet" — see `fleet-registry`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub cpu_used: f64,
    pub mem_used: f64,
    pub xpu_used: f64,
    pub net_latency: f64,
    pub net_bandwidth: f64,
    pub disconnect_time: f64,
    pub reconnect_time: f64,
    pub time_window: f64,
}

impl NodeStatus {
    /// The weighted sum the load-based policy minimizes.
    ///
    /// `net_bandwidth` is reported in Mbps (roughly 50-500) while the
    /// other terms live in `[0, 1]`, so this weighting lets bandwidth
    /// dominate unless latency is very large too — see the Open Question
    /// in `spec.md` §9, resolved in `DESIGN.md` as "keep as specified".
    pub fn load_score(&self) -> f64 {
        0.3 * self.cpu_used + 0.1 * self.mem_used + 0.4 * self.xpu_used
            + 1.0 * self.net_bandwidth
            + 1.0 * self.net_latency
    }

    /// Whether this node's reported latency toward the gateway indicates
    /// it can no longer be reached reliably (§4.7: strictly greater than
    /// 10.0s, exactly-at-threshold does not trigger recovery).
    pub fn is_unreachable(&self) -> bool {
        self.net_latency / 1000.0 > 10.0
    }
}
