use std::sync::Arc;

use clap::Parser;
use fleet_containers::DockerEngineClient;
use fleet_gateway::config::GatewayArgs;
use fleet_gateway::{AppState, router};
use fleet_observe::{LoggerConfig, LoggerFormat, logger_init};
use fleet_registry::StaticProfileStore;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = GatewayArgs::parse();

    let log_format: LoggerFormat = args
        .log_format
        .parse()
        .unwrap_or(LoggerFormat::Text);
    logger_init(&LoggerConfig {
        format: log_format,
        level: args.log_level.clone(),
        ..LoggerConfig::default()
    })?;

    let static_info_path = args.config_dir.join("static_info.json");
    let profiles = StaticProfileStore::load(&static_info_path)?;

    let engine = Arc::new(DockerEngineClient::new("http://127.0.0.1:2375", "v1.44"));
    let state = AppState::new(profiles, engine, args.task_dir.clone(), args.keep_upload);
    state.scheduler.start();

    let health_monitor = Arc::new(fleet_schedule::HealthMonitor::new(
        Arc::clone(&state.registry),
        Arc::clone(&state.queue),
    ));
    health_monitor.spawn();

    let app = router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(bind = %args.bind, "fleet-masterd listening");
    axum::serve(listener, app).await?;

    Ok(())
}
