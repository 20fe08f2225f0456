//! HTTP server runtime

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use super::router::{AppState, create_router};
use super::service::McpService;
use crate::config::Config;
use crate::{Error, Result};

/// Streamable HTTP MCP server
pub struct HttpServer {
    config: Config,
    service: Arc<McpService>,
}

impl HttpServer {
    /// Create a new server from configuration
    pub fn new(config: Config) -> Result<Self> {
        let service = Arc::new(McpService::new(&config)?);
        Ok(Self { config, service })
    }

    /// Run until ctrl-c or SIGTERM
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let state = Arc::new(AppState {
            service: Arc::clone(&self.service),
            max_body_size: self.config.server.max_body_size,
        });
        let app = create_router(state);

        let listener = TcpListener::bind(addr).await?;

        info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            prometheus = %self.config.prometheus.url,
            "Prometheus MCP server listening"
        );
        info!(
            "  POST http://{}:{}/mcp  (JSON-RPC requests)",
            self.config.server.host, self.config.server.port
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
