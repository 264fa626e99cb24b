//! Agent Collector (C10): the 20 Hz sampling loop and the cached
//! `DeviceStatus` it produces, served by `GET /usage/device_info`.

mod cpu;
mod mem;
mod net;
mod xpu;

use std::sync::RwLock;
use std::time::Duration;

use fleet_model::DeviceType;
use serde::Serialize;
use tracing::debug;

use self::cpu::CpuSampler;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// The wire shape of `GET /usage/device_info`'s `result` object (§6.2).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeviceStatus {
    pub mem: f64,
    pub cpu_used: f64,
    pub xpu_used: f64,
    pub net_latency: f64,
    pub net_bandwidth: f64,
    #[serde(rename = "disconnectTime")]
    pub disconnect_time: i64,
    #[serde(rename = "reconnectTime")]
    pub reconnect_time: i64,
    #[serde(rename = "timeWindow")]
    pub time_window: i64,
}

pub struct Collector {
    kind: DeviceType,
    gateway_base_url: String,
    bandwidth_fluctuate: bool,
    disconnect_sec: i64,
    reconnect_sec: i64,
    cpu: CpuSampler,
    http: reqwest::Client,
    latest: RwLock<DeviceStatus>,
}

impl Collector {
    pub fn new(
        kind: DeviceType,
        gateway_base_url: String,
        bandwidth_fluctuate: bool,
        disconnect_sec: i64,
        reconnect_sec: i64,
    ) -> Self {
        Self {
            kind,
            gateway_base_url,
            bandwidth_fluctuate,
            disconnect_sec,
            reconnect_sec,
            cpu: CpuSampler::new(),
            http: reqwest::Client::new(),
            latest: RwLock::new(DeviceStatus {
                mem: 0.0,
                cpu_used: 0.0,
                xpu_used: 0.0,
                net_latency: 0.0,
                net_bandwidth: net::bandwidth_mbps(bandwidth_fluctuate),
                disconnect_time: disconnect_sec,
                reconnect_time: reconnect_sec,
                time_window: 5,
            }),
        }
    }

    pub fn snapshot(&self) -> DeviceStatus {
        *self.latest.read().unwrap()
    }

    async fn sample_once(&self) {
        let cpu_used = self.cpu.sample();
        let mem = mem::sample().unwrap_or(0.0);
        let xpu_used = xpu::sample(self.kind);
        let net_latency = net::latency_ms(&self.http, &self.gateway_base_url).await;
        let net_bandwidth = net::bandwidth_mbps(self.bandwidth_fluctuate);

        let status = DeviceStatus {
            mem,
            cpu_used,
            xpu_used,
            net_latency,
            net_bandwidth,
            disconnect_time: self.disconnect_sec,
            reconnect_time: self.reconnect_sec,
            time_window: 5,
        };
        debug!(
            cpu = cpu_used * 100.0,
            mem = mem * 100.0,
            xpu = xpu_used * 100.0,
            latency_ms = net_latency,
            bandwidth_mbps = net_bandwidth,
            "device_info sampled"
        );
        *self.latest.write().unwrap() = status;
    }

    /// Runs the 20 Hz sampling loop forever. Intended to be spawned as a
    /// background Tokio task for the life of the process.
    pub async fn run(self: std::sync::Arc<Self>) {
        let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
        loop {
            ticker.tick().await;
            self.sample_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_once_populates_snapshot() {
        let collector = Collector::new(
            DeviceType::Rk3588,
            "http://127.0.0.1:1".to_string(),
            false,
            30,
            20,
        );
        collector.sample_once().await;
        let snap = collector.snapshot();
        assert_eq!(snap.disconnect_time, 30);
        assert_eq!(snap.reconnect_time, 20);
        assert_eq!(snap.time_window, 5);
    }
}
