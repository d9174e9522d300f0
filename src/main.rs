//! zk-node - ZooKeeper configuration and supervision for a cluster node
//!
//! This is the main entry point for the zk-node command.

use std::{process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zk_node::{
    api::create_router,
    config::{resolve_nodes, Command, Config},
    state::AppState,
    utils::shutdown_signal,
};

/// LSB exit code for "program is not running"
const EXIT_NOT_RUNNING: u8 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    // RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("zk_node={},tower_http=info", config.log_level()))
    });
    // stdout carries only command results
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let zookeeper = config.zookeeper();

    match &config.command {
        Command::Configure { index, node, nodes } => {
            let nodes = resolve_nodes(node, nodes.as_ref())?;
            let rendered = zookeeper.configure(&nodes, *index)?;
            info!("Configuration written to {}", config.conf_dir.display());
            println!("{}", rendered.myid());
        }
        Command::Start { clear_datastore } => {
            zookeeper.start(*clear_datastore).await?;
        }
        Command::Stop => {
            zookeeper.stop().await;
        }
        Command::Status => {
            let running = zookeeper.is_running().await;
            println!("zookeeper is {}", if running { "running" } else { "not running" });
            if !running {
                return Ok(ExitCode::from(EXIT_NOT_RUNNING));
            }
        }
        Command::Serve { host, port } => {
            let state = Arc::new(AppState::new(zookeeper, *port, host.clone()));
            let app = create_router(state);

            let addr = format!("{}:{}", host, port);
            let listener = TcpListener::bind(&addr).await?;

            info!("Starting zk-node server v{}", env!("CARGO_PKG_VERSION"));
            info!("Server running on http://{}", addr);
            info!("Endpoints:");
            info!("  POST /zookeeper/configure - Write zoo.cfg and myid");
            info!("  POST /zookeeper/start     - Start ZooKeeper under monit");
            info!("  POST /zookeeper/stop      - Stop ZooKeeper");
            info!("  GET  /zookeeper/status    - Check whether ZooKeeper is running");
            info!("  GET  /health              - Health check");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Server shutdown complete");
        }
    }

    Ok(ExitCode::SUCCESS)
}
