use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use fleet_agent::collector::Collector;
use fleet_agent::config::AgentArgs;
use fleet_agent::services::{AgentServicesConfig, SlaveBackendConfig, load_json_or_default, unique_union};
use fleet_agent::supervisor::{ManagedSpec, ProcessSupervisor};
use fleet_agent::{AppState, node_id, registration, router};
use fleet_model::DeviceType;
use fleet_observe::{LoggerConfig, LoggerFormat, logger_init};
use tracing::{error, info};

/// Best-effort detection of this host's outbound IP by "connecting" a UDP
/// socket to the master (no packets are sent; this just asks the kernel to
/// pick a route) and reading back the local address it bound.
fn detect_local_ip(master_ip: &str, master_port: u16) -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect((master_ip, master_port))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AgentArgs::parse();

    let log_format: LoggerFormat = args.log_format.parse().unwrap_or(LoggerFormat::Text);
    logger_init(&LoggerConfig {
        format: log_format,
        level: args.log_level.clone(),
        ..LoggerConfig::default()
    })?;

    let kind: DeviceType = args.device_type.parse().map_err(|e| {
        error!(device_type = %args.device_type, "unrecognized device type");
        anyhow::anyhow!("unrecognized device type {:?}: {e}", args.device_type)
    })?;

    let project_root = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let global_id = node_id::load_or_create().await?;
    let ip = detect_local_ip(&args.master_ip, args.master_port);
    let port = args
        .bind
        .rsplit(':')
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let master_base_url = format!("http://{}:{}", args.master_ip, args.master_port);
    let reg_client = Arc::new(registration::RegistrationClient::new(master_base_url));

    let agent_services: AgentServicesConfig =
        load_json_or_default(&args.config_dir.join("agent_services.json")).await;
    let backend_cfg: SlaveBackendConfig =
        load_json_or_default(&args.config_dir.join("slave_backend.json")).await;

    let autostart = unique_union(
        agent_services.autostart_services.clone(),
        &backend_cfg.autostart_from_backend(),
    );

    if !reg_client
        .register(kind, global_id, &ip, port, &autostart)
        .await
    {
        anyhow::bail!("initial registration with master failed, aborting startup");
    }

    let disconnect_sec = args.disconnect;
    let reconnect_sec = args.reconnect;
    tokio::spawn({
        let reg_client = Arc::clone(&reg_client);
        let ip = ip.clone();
        let services = autostart.clone();
        async move {
            registration::auto_connect_loop(
                &reg_client,
                kind,
                global_id,
                ip,
                port,
                services,
                disconnect_sec,
                reconnect_sec,
            )
            .await;
        }
    });

    let collector = Arc::new(Collector::new(
        kind,
        format!("http://{}:{}", args.master_ip, args.master_port),
        args.bandwidth_fluctuate,
        args.disconnect,
        args.reconnect,
    ));
    tokio::spawn(Arc::clone(&collector).run());

    let supervisor = Arc::new(ProcessSupervisor::start().await);
    let restart_delay = Duration::from_secs(agent_services.restart_delay_sec.unwrap_or(5));

    if !args.no_manage_services {
        if let Some(cmd) = &agent_services.recv_server_cmd {
            supervisor
                .spawn(ManagedSpec {
                    name: "recv_server".to_string(),
                    cmd: cmd.clone(),
                    env: Vec::new(),
                    cwd: None,
                    log_path: args.log_dir.join("recv_server.log"),
                    restart_delay,
                })
                .await;
        }
        if let Some(cmd) = &agent_services.rst_send_cmd {
            supervisor
                .spawn(ManagedSpec {
                    name: "rst_send".to_string(),
                    cmd: cmd.clone(),
                    env: Vec::new(),
                    cwd: None,
                    log_path: args.log_dir.join("rst_send.log"),
                    restart_delay,
                })
                .await;
        }

        let launcher_cfg = backend_cfg.clone();
        let launcher = fleet_agent::backend::BackendLauncher {
            supervisor: supervisor.as_ref(),
            cfg: &launcher_cfg,
            project_root: &project_root,
            log_dir: &args.log_dir,
            restart_delay,
        };
        for name in &autostart {
            if let Err(e) = launcher.ensure_started(name).await {
                error!(service = name, error = %e, "failed to autostart service");
            }
        }
    }

    let allow_remote_control = std::env::var("AGENT_ALLOW_REMOTE_CONTROL")
        .map(|v| v == "1")
        .unwrap_or(false);

    let state = Arc::new(AppState {
        kind,
        global_id,
        collector,
        supervisor,
        backend_cfg,
        supported_services: autostart,
        project_root: project_root.clone(),
        log_dir: args.log_dir.clone(),
        restart_delay,
        allow_remote_control,
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(bind = %args.bind, %global_id, "fleet-agentd listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
