//! The stdio line loop: one JSON-RPC request per line in, one response per
//! line out. Responses go to the writer; logs go to stderr via `tracing`.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use marketgate::Gateway;
use marketgate_core::sanitize::redact_secrets;

use crate::protocol::{
    INTERNAL_ERROR, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION, ServerCapabilities, ServerInfo, InitializeResult, ToolContent,
    ToolsCallParams, ToolsCallResult, ToolsListResult,
};
use crate::tools;

/// Server name reported by `initialize`.
const SERVER_NAME: &str = "marketgate-server";

/// Run the request loop until the reader reaches end of stream.
///
/// # Errors
/// Returns an error only on writer failures; per-request problems become
/// JSON-RPC error responses.
pub async fn run<R, W>(gateway: Arc<Gateway>, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&gateway, line).await {
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            writer.write_all(payload.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    debug!("stdin closed, shutting down");
    Ok(())
}

/// Handle one wire line. Returns `None` for notifications.
pub async fn handle_line(gateway: &Gateway, line: &str) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "malformed request line");
            return Some(JsonRpcResponse::err(
                serde_json::Value::Null,
                PARSE_ERROR,
                "parse error",
            ));
        }
    };

    let id = request.id.clone()?; // notifications get no response
    Some(handle_request(gateway, request, id).await)
}

async fn handle_request(
    gateway: &Gateway,
    request: JsonRpcRequest,
    id: serde_json::Value,
) -> JsonRpcResponse {
    debug!(method = %request.method, "dispatching request");
    match request.method.as_str() {
        "initialize" => {
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION.to_string(),
                capabilities: ServerCapabilities::default(),
                server_info: ServerInfo {
                    name: SERVER_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            };
            match serde_json::to_value(result) {
                Ok(v) => JsonRpcResponse::ok(id, v),
                Err(e) => JsonRpcResponse::err(id, INTERNAL_ERROR, e.to_string()),
            }
        }
        "tools/list" => {
            let result = ToolsListResult {
                tools: tools::definitions(),
            };
            match serde_json::to_value(result) {
                Ok(v) => JsonRpcResponse::ok(id, v),
                Err(e) => JsonRpcResponse::err(id, INTERNAL_ERROR, e.to_string()),
            }
        }
        "tools/call" => {
            let params: ToolsCallParams =
                match serde_json::from_value(request.params.unwrap_or_default()) {
                    Ok(p) => p,
                    Err(e) => {
                        return JsonRpcResponse::err(
                            id,
                            INTERNAL_ERROR,
                            format!("invalid tools/call params: {e}"),
                        );
                    }
                };
            match tools::call(gateway, &params.name, &params.arguments).await {
                Ok(text) => {
                    let result = ToolsCallResult {
                        content: vec![ToolContent::Text { text }],
                    };
                    match serde_json::to_value(result) {
                        Ok(v) => JsonRpcResponse::ok(id, v),
                        Err(e) => JsonRpcResponse::err(id, INTERNAL_ERROR, e.to_string()),
                    }
                }
                Err(e) => {
                    warn!(tool = %params.name, error = %e, "tool call failed");
                    JsonRpcResponse::err(id, INTERNAL_ERROR, redact_secrets(&e.to_string()))
                }
            }
        }
        other => JsonRpcResponse::err(id, METHOD_NOT_FOUND, format!("unknown method: {other}")),
    }
}
