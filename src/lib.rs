//! Prometheus MCP Server
//!
//! Exposes the Prometheus HTTP API (instant query, range query, series,
//! labels, label values, targets, metadata, health) as Model Context
//! Protocol tools, over stdio or stateless Streamable HTTP.
//!
//! # Features
//!
//! - **Range guard**: `query_range` calls are rejected locally when the
//!   requested window or computed sample count exceeds configured limits
//! - **Multi-Transport**: stdio and Streamable HTTP (POST /mcp)
//! - **Auth passthrough**: bearer token or basic credentials forwarded to
//!   the backend, built once at startup
//!
//! # Protocol Version
//!
//! Implements MCP protocol versions 2024-11-05 and 2025-03-26 (Streamable HTTP).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod prometheus;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// Log output goes to stderr: stdout carries the protocol stream when
/// serving over stdio.
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
