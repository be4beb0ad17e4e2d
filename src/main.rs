//! Instance group test node.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                  INSTANCE NODE                   │
//!                 │                                                  │
//!   GET /health   │  ┌────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ──────────────┼─▶│  http  │───▶│ handlers │───▶│ node state  │  │
//!   GET /startLoad│  │ server │    │          │    │ health flag │  │
//!   ...           │  └────────┘    └────┬─────┘    │ load flag   │  │
//!                 │                     │          └──────┬──────┘  │
//!                 │                     ▼                 │ flag    │
//!                 │              ┌────────────┐   ┌──────▼──────┐  │
//!                 │              │  metadata  │   │ load worker │  │
//!                 │              │   client   │   │ (OS thread) │  │
//!                 │              └────────────┘   └─────────────┘  │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! The node answers instance-group health checks with a status operators can
//! flip, and can burn CPU on demand to drive autoscaling.

use std::path::PathBuf;

use clap::Parser;

use instance_node::config;
use instance_node::lifecycle::{signals, startup, Shutdown, Started};
use instance_node::observability::logging;

#[derive(Parser)]
#[command(name = "instance-node")]
#[command(about = "Instance group node with toggleable health and CPU load", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides config file and PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    logging::init(&config.observability)?;

    tracing::info!("instance-node v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        poll_interval_ms = config.load.poll_interval_ms,
        metadata_enabled = config.metadata.enabled,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let Started {
        server,
        listener,
        state,
    } = match startup(config).await {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
        }
        _ = signals::wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
    }

    state.node.load().stop();
    drop(state);

    tracing::info!("Shutdown complete");
    Ok(())
}
