//! Registration with the master and the disconnect/reconnect cycle
//! (§4.11), grounded on the original's `RegisterNode`/`DisconnectNode`/
//! `AutoConnectThread`.

use std::collections::HashSet;
use std::time::Duration;

use fleet_model::{DeviceType, Node, NodeId, TaskType};
use tracing::{error, info};

pub struct RegistrationClient {
    http: reqwest::Client,
    master_base_url: String,
}

impl RegistrationClient {
    pub fn new(master_base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            master_base_url,
        }
    }

    fn node(&self, kind: DeviceType, global_id: NodeId, ip: &str, port: u16, services: &[String]) -> Node {
        let services: HashSet<TaskType> = services.iter().filter_map(|s| s.parse().ok()).collect();
        Node {
            global_id,
            kind,
            ip_address: ip.to_string(),
            agent_port: port,
            services: if services.is_empty() { None } else { Some(services) },
        }
    }

    pub async fn register(
        &self,
        kind: DeviceType,
        global_id: NodeId,
        ip: &str,
        port: u16,
        services: &[String],
    ) -> bool {
        let node = self.node(kind, global_id, ip, port, services);
        match self
            .http
            .post(format!("{}/register_node", self.master_base_url))
            .json(&node)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                info!("node registered successfully");
                true
            }
            Ok(resp) => {
                error!(status = %resp.status(), "failed to register node");
                false
            }
            Err(e) => {
                error!(error = %e, "failed to register node");
                false
            }
        }
    }

    pub async fn unregister(&self, kind: DeviceType, global_id: NodeId, ip: &str, port: u16) -> bool {
        let node = self.node(kind, global_id, ip, port, &[]);
        match self
            .http
            .post(format!("{}/unregister_node", self.master_base_url))
            .json(&node)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                info!("node disconnected successfully");
                true
            }
            Ok(resp) => {
                error!(status = %resp.status(), "failed to disconnect node");
                false
            }
            Err(e) => {
                error!(error = %e, "failed to disconnect node");
                false
            }
        }
    }
}

/// Background loop alternating disconnect/reconnect every
/// `disconnect_sec`/`reconnect_sec`, matching `AutoConnectThread`.
/// `disconnect_sec <= 0` disables the cycle entirely (the task just idles
/// until cancellation).
pub async fn auto_connect_loop(
    client: &RegistrationClient,
    kind: DeviceType,
    global_id: NodeId,
    ip: String,
    port: u16,
    services: Vec<String>,
    disconnect_sec: i64,
    reconnect_sec: i64,
) {
    if disconnect_sec <= 0 {
        info!("auto-disconnect is disabled (disconnect time <= 0)");
        std::future::pending::<()>().await;
        return;
    }

    loop {
        tokio::time::sleep(Duration::from_secs(disconnect_sec as u64)).await;
        client.unregister(kind, global_id, &ip, port).await;

        tokio::time::sleep(Duration::from_secs(reconnect_sec.max(1) as u64)).await;
        client.register(kind, global_id, &ip, port, &services).await;
    }
}
