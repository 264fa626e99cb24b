use std::path::PathBuf;

use clap::Parser;

fn parse_positive(s: &str) -> Result<i64, String> {
    let v: i64 = s.parse().map_err(|_| format!("invalid integer: {s}"))?;
    if v <= 0 {
        return Err("must be positive".to_string());
    }
    Ok(v)
}

/// CLI for `fleet-agentd`, matching §6.5.
#[derive(Debug, Parser)]
#[command(name = "fleet-agentd", about = "Edge inference fleet worker agent")]
pub struct AgentArgs {
    /// Master/gateway IP.
    #[arg(long = "master-ip", env = "MASTER_IP", default_value = "127.0.0.1")]
    pub master_ip: String,

    /// Master/gateway port.
    #[arg(long = "master-port", env = "MASTER_PORT", default_value_t = 6666)]
    pub master_port: u16,

    /// Auto-disconnect time in seconds; <=0 disables the cycle.
    #[arg(long = "disconnect", default_value_t = 30)]
    pub disconnect: i64,

    /// Auto-reconnect time in seconds; must be positive.
    #[arg(long = "reconnect", default_value_t = 20, value_parser = parse_positive)]
    pub reconnect: i64,

    /// Simulate bandwidth fluctuation (50-500 Mbps) instead of a fixed value.
    #[arg(long = "bandwidth-fluctuate")]
    pub bandwidth_fluctuate: bool,

    /// Do not start/manage recv_server, rst_send, or autostart backends.
    #[arg(long = "no-manage-services")]
    pub no_manage_services: bool,

    /// Directory containing `agent_services.json` and `slave_backend.json`.
    #[arg(long = "config", short = 'c', default_value = "./config_files")]
    pub config_dir: PathBuf,

    /// Directory managed processes log into.
    #[arg(long = "log-dir", default_value = "./workspace/slave/log")]
    pub log_dir: PathBuf,

    /// Address this agent's HTTP server binds to.
    #[arg(long = "bind", env = "FLEET_AGENT_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// This node's hardware family.
    #[arg(long = "device-type", env = "FLEET_DEVICE_TYPE", default_value = "RK3588")]
    pub device_type: String,

    #[arg(long = "log-level", env = "FLEET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long = "log-format", env = "FLEET_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}
