//! Stdio transport: newline-delimited JSON-RPC over stdin/stdout

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use super::McpService;
use crate::Result;
use crate::error::rpc_codes;
use crate::protocol::{JsonRpcMessage, JsonRpcResponse};

/// Serve a single MCP session over stdin/stdout. Returns when stdin closes.
pub async fn serve(service: Arc<McpService>) -> Result<()> {
    run(
        service,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

async fn run<R, W>(service: Arc<McpService>, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcMessage>(line) {
            Ok(message) => service.handle_message(message).await,
            // A malformed line gets an error response, not a dead loop
            Err(e) => Some(JsonRpcResponse::error(
                None,
                rpc_codes::PARSE_ERROR,
                format!("Invalid JSON: {e}"),
            )),
        };

        if let Some(response) = response {
            let payload = serde_json::to_string(&response)?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    debug!("stdin closed, session over");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::config::Config;

    fn test_service() -> Arc<McpService> {
        let mut config = Config::default();
        config.prometheus.url = "http://127.0.0.1:9".to_string();
        Arc::new(McpService::new(&config).unwrap())
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let service = test_service();
        let reader = BufReader::new(input.as_bytes());
        let mut output = Vec::new();
        run(service, reader, &mut output).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn initialize_then_tools_list_on_consecutive_lines() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );

        let responses = exchange(input).await;
        // The notification produced no output line
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "mcp-prometheus");
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn malformed_line_yields_parse_error_and_loop_survives() {
        let input = concat!(
            "this is not json\n",
            r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
            "\n",
        );

        let responses = exchange(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], 7);
        assert!(responses[1]["error"].is_null());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let input = concat!("\n", "   \n", r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n");
        let responses = exchange(input).await;
        assert_eq!(responses.len(), 1);
    }
}
