//! HTTP router and handlers
//!
//! Stateless Streamable HTTP: each POST carries one JSON-RPC message and
//! receives one response. No sessions, no SSE stream.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};

use super::McpService;
use crate::protocol::JsonRpcMessage;

/// Shared application state
pub struct AppState {
    /// MCP dispatch service
    pub service: Arc<McpService>,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/mcp",
            post(mcp_handler).get(mcp_get_handler).delete(mcp_delete_handler),
        )
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// POST /mcp handler - one JSON-RPC message in, one response out
async fn mcp_handler(
    State(state): State<Arc<AppState>>,
    request: axum::http::Request<axum::body::Body>,
) -> impl IntoResponse {
    let body_bytes = match axum::body::to_bytes(request.into_body(), state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "jsonrpc": "2.0",
                    "error": {"code": -32700, "message": format!("Failed to read body: {e}")},
                    "id": null
                })),
            )
                .into_response();
        }
    };

    let message: JsonRpcMessage = match serde_json::from_slice(&body_bytes) {
        Ok(m) => m,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "jsonrpc": "2.0",
                    "error": {"code": -32700, "message": format!("Invalid JSON: {e}")},
                    "id": null
                })),
            )
                .into_response();
        }
    };

    match state.service.handle_message(message).await {
        Some(response) => {
            Json(serde_json::to_value(response).unwrap_or(Value::Null)).into_response()
        }
        // Notifications are accepted with no body
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// GET /mcp handler - this server has no notification stream to offer
async fn mcp_get_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32600,
                "message": "Streaming not supported. Send JSON-RPC requests via POST /mcp"
            },
            "id": null
        })),
    )
}

/// DELETE /mcp handler - stateless mode has no session to terminate
async fn mcp_delete_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": -32000,
                "message": "Method not allowed."
            },
            "id": null
        })),
    )
}
