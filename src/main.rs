//! Prometheus MCP server - PromQL queries and metadata endpoints as MCP tools

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use mcp_prometheus::{
    cli::{Cli, Command},
    config::Config,
    server::{HttpServer, McpService, stdio},
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            // Apply CLI overrides
            if let Some(ref url) = cli.url {
                config.prometheus.url = url.clone();
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::Stdio) => run_stdio(config).await,
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Serve one MCP session over stdin/stdout
async fn run_stdio(config: Config) -> ExitCode {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        prometheus = %config.prometheus.url,
        "Starting Prometheus MCP server (stdio)"
    );

    let service = match McpService::new(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to create service: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = stdio::serve(service).await {
        error!("Stdio transport error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Run the Streamable HTTP server
async fn run_server(config: Config) -> ExitCode {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        prometheus = %config.prometheus.url,
        "Starting Prometheus MCP server"
    );

    let server = match HttpServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create server: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
