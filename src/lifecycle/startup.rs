//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared node state (spawns the load worker)
//! - Build the metadata client
//! - Start the metrics endpoint when enabled
//! - Bind the listener last

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::NodeConfig;
use crate::http::{AppState, HttpServer, ServerError};
use crate::metadata::{MetadataClient, MetadataError};
use crate::node::NodeState;
use crate::observability::metrics;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to spawn load generator: {0}")]
    LoadWorker(std::io::Error),

    #[error("failed to build metadata client: {0}")]
    Metadata(#[from] MetadataError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// A node ready to serve.
pub struct Started {
    pub server: HttpServer,
    pub listener: TcpListener,
    pub state: AppState,
}

/// Initialize every subsystem in dependency order.
pub async fn startup(config: NodeConfig) -> Result<Started, StartupError> {
    let node = NodeState::new(&config.load).map_err(StartupError::LoadWorker)?;
    let metadata = Arc::new(MetadataClient::new(&config.metadata)?);
    if !metadata.is_enabled() {
        tracing::info!("Metadata lookups disabled");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| {
                StartupError::MetricsAddress(config.observability.metrics_address.clone())
            })?;
        metrics::init_metrics(addr)?;
    }
    metrics::set_healthy(node.health().is_healthy());
    metrics::set_load_running(node.load().is_running());

    let state = AppState { node, metadata };
    let listener = HttpServer::bind(&config).await?;
    let server = HttpServer::new(config, state.clone());

    Ok(Started {
        server,
        listener,
        state,
    })
}
