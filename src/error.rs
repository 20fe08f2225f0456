//! Error types for the Prometheus MCP server

use std::io;

use thiserror::Error;

/// Result type alias for the Prometheus MCP server
pub type Result<T> = std::result::Result<T, Error>;

/// Prometheus MCP server errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Range-query window exceeds the configured day limit
    #[error("Range window exceeds {limit_days} days")]
    RangeTooLarge {
        /// Configured maximum window in days
        limit_days: u32,
    },

    /// Computed sample count exceeds the configured ceiling
    #[error("Sample resolution exceeds {limit} points")]
    TooManySamples {
        /// Configured maximum sample count
        limit: u64,
    },

    /// Metrics backend unreachable, timed out, or returned a non-2xx status
    #[error("Prometheus unavailable: {source}")]
    BackendUnavailable {
        /// Underlying transport/HTTP failure
        #[from]
        source: reqwest::Error,
    },

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON-RPC error
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// Error code
        code: i32,
        /// Error message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a JSON-RPC error
    pub fn json_rpc(code: i32, message: impl Into<String>) -> Self {
        Self::JsonRpc {
            code,
            message: message.into(),
        }
    }

    /// Convert to JSON-RPC error code
    #[must_use]
    pub fn to_rpc_code(&self) -> i32 {
        match self {
            Self::JsonRpc { code, .. } => *code,
            Self::Json(_) => rpc_codes::PARSE_ERROR,
            Self::Protocol(_) => rpc_codes::INVALID_REQUEST,
            Self::RangeTooLarge { .. } | Self::TooManySamples { .. } => rpc_codes::INVALID_PARAMS,
            Self::BackendUnavailable { .. } => rpc_codes::SERVER_ERROR_START,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Standard JSON-RPC error codes
pub mod rpc_codes {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - Not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Server error range start
    pub const SERVER_ERROR_START: i32 = -32000;
}
