//! CloudIDE execution server - Application Entry Point

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cloudide::{build_router, config::CONFIG, sandbox::DockerRuntime, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CloudIDE execution server...");

    // Initialize Docker client
    tracing::info!(socket = %CONFIG.docker.socket_path, "Connecting to Docker...");
    let runtime = DockerRuntime::connect(&CONFIG.docker)?;

    // Verify Docker connection
    let docker_info = runtime.docker().version().await?;
    tracing::info!(
        "Connected to Docker version: {}",
        docker_info.version.unwrap_or_default()
    );

    let execution = &CONFIG.execution;
    tracing::info!(
        timeout_secs = execution.timeout.as_secs_f64(),
        memory_mb = execution.memory_limit_mb,
        cpu_limit = execution.cpu_limit,
        max_concurrent = ?execution.max_concurrent,
        max_output_bytes = execution.max_output_bytes,
        scratch_dir = %execution.scratch_dir.display(),
        "Execution limits loaded"
    );

    // Create application state
    let state = AppState::new(CONFIG.clone(), Arc::new(runtime));

    let app = build_router(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
