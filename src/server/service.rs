//! MCP request dispatch

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::rpc_codes;
use crate::prometheus::PrometheusClient;
use crate::protocol::{
    Content, Info, InitializeParams, InitializeResult, JsonRpcMessage, JsonRpcRequest,
    JsonRpcResponse, RequestId, ServerCapabilities, ToolsCallParams, ToolsCallResult,
    ToolsCapability, ToolsListResult, negotiate_version,
};
use crate::tools;
use crate::{Error, Result};

/// Stateless MCP service: dispatches JSON-RPC messages to tool handlers.
///
/// Holds only the immutable gateway client and configuration-derived
/// defaults, so it is safe to share across concurrent sessions.
pub struct McpService {
    client: Arc<PrometheusClient>,
    default_limit: Option<u64>,
}

impl McpService {
    /// Create a service from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(PrometheusClient::new(&config.prometheus)?);
        let default_limit =
            (config.prometheus.default_limit > 0).then_some(config.prometheus.default_limit);
        Ok(Self {
            client,
            default_limit,
        })
    }

    /// Handle one JSON-RPC message. Notifications and stray responses
    /// produce no output.
    pub async fn handle_message(&self, message: JsonRpcMessage) -> Option<JsonRpcResponse> {
        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                debug!(method = %notification.method, "Notification received");
                None
            }
            JsonRpcMessage::Response(_) => {
                debug!("Ignoring unexpected response message");
                None
            }
        }
    }

    /// Handle one JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        match request.method.as_str() {
            "initialize" => Self::handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => Self::handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            method => JsonRpcResponse::error(
                Some(id),
                rpc_codes::METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            ),
        }
    }

    fn handle_initialize(id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(p)) => p,
            Ok(None) => {
                return JsonRpcResponse::error(
                    Some(id),
                    rpc_codes::INVALID_PARAMS,
                    "Missing initialize params",
                );
            }
            Err(e) => {
                return JsonRpcResponse::error(
                    Some(id),
                    rpc_codes::INVALID_PARAMS,
                    format!("Invalid initialize params: {e}"),
                );
            }
        };

        let negotiated = negotiate_version(&params.protocol_version);
        debug!(
            client = %params.client_info.name,
            requested = %params.protocol_version,
            negotiated = %negotiated,
            "Initialize"
        );

        let result = InitializeResult {
            protocol_version: negotiated.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: Info {
                name: "mcp-prometheus".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
            },
            instructions: None,
        };

        Self::to_success(id, &result)
    }

    fn handle_tools_list(id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: tools::definitions(),
            next_cursor: None,
        };
        Self::to_success(id, &result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolsCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(p)) => p,
            Ok(None) => {
                return JsonRpcResponse::error(
                    Some(id),
                    rpc_codes::INVALID_PARAMS,
                    "Missing tools/call params",
                );
            }
            Err(e) => {
                return JsonRpcResponse::error(
                    Some(id),
                    rpc_codes::INVALID_PARAMS,
                    format!("Invalid tools/call params: {e}"),
                );
            }
        };

        let result = match tools::call(
            &self.client,
            self.default_limit,
            &params.name,
            params.arguments,
        )
        .await
        {
            Ok(text) => ToolsCallResult {
                content: vec![Content::text(text)],
                is_error: false,
            },
            // Shape problems are protocol errors, not tool output
            Err(Error::JsonRpc { code, message }) => {
                return JsonRpcResponse::error(Some(id), code, message);
            }
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                ToolsCallResult {
                    content: vec![Content::text(format!("Error: {e}"))],
                    is_error: true,
                }
            }
        };

        Self::to_success(id, &result)
    }

    fn to_success<T: serde::Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                Some(id),
                rpc_codes::INTERNAL_ERROR,
                format!("Failed to serialize result: {e}"),
            ),
        }
    }
}
