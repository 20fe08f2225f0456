//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Prometheus MCP server - PromQL queries and metadata endpoints as MCP tools
#[derive(Parser, Debug)]
#[command(name = "mcp-prometheus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "MCP_PROMETHEUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Prometheus base URL (e.g. http://localhost:9090)
    #[arg(long, env = "PROMETHEUS_BASE_URL")]
    pub url: Option<String>,

    /// Port to listen on (HTTP transport)
    #[arg(short, long, env = "MCP_PROMETHEUS_PORT")]
    pub port: Option<u16>,

    /// Host to bind to (HTTP transport)
    #[arg(long, env = "MCP_PROMETHEUS_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "MCP_PROMETHEUS_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "MCP_PROMETHEUS_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to HTTP server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the Streamable HTTP server (default)
    Serve,

    /// Serve a single MCP session over stdin/stdout
    Stdio,
}
