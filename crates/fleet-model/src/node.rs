use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DeviceType, NodeId, TaskType};

/// A worker node, immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub global_id: NodeId,
    #[serde(rename = "type")]
    pub kind: DeviceType,
    pub ip_address: String,
    pub agent_port: u16,
    /// Task types the node reports an active service for, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<HashSet<TaskType>>,
}

impl Node {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.ip_address, self.agent_port)
    }
}
