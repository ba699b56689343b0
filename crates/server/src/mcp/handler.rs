//! Method routing for JSON-RPC messages, shared by both transports.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::mcp::dispatch::call_tool;
use crate::mcp::protocol::{
    parse_request, JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND,
    PROTOCOL_VERSION,
};
use crate::mcp::resources::{read_resource, resource_definitions};
use crate::mcp::tools::tool_definitions;
use crate::state::AppState;

pub const SERVER_NAME: &str = "vidcat-server";

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

/// Handle one raw message. Returns `None` for notifications.
pub async fn handle_message(state: &AppState, raw: &str) -> Option<JsonRpcResponse> {
    match parse_request(raw) {
        Ok(request) => handle_request(state, request).await,
        Err(response) => {
            tracing::warn!(error = ?response.error, "Rejected malformed message");
            Some(response)
        }
    }
}

/// Handle one parsed request. Returns `None` for notifications.
pub async fn handle_request(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.is_notification() {
        tracing::debug!(method = %request.method, "Received notification");
        return None;
    }
    let id = request.id.unwrap_or(Value::Null);

    let response = match dispatch_method(state, &request.method, request.params).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(err) => {
            tracing::warn!(method = %request.method, error = %err, "Request failed");
            JsonRpcResponse::error(id, err.rpc_code(), err.client_message())
        }
    };
    Some(response)
}

async fn dispatch_method(
    state: &AppState,
    method: &str,
    params: Option<Value>,
) -> Result<Value, AppError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let params: CallToolParams = params_of(params)?;
            let output = call_tool(state, &params.name, params.arguments).await?;
            Ok(output.into_value())
        }
        "resources/list" => Ok(json!({ "resources": resource_definitions() })),
        "resources/read" => {
            let params: ReadResourceParams = params_of(params)?;
            read_resource(&params.uri)
        }
        other => Err(AppError::MethodNotFound(other.to_string())),
    }
}

fn params_of<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, AppError> {
    let params = params.ok_or_else(|| AppError::InvalidParams("Missing params".into()))?;
    serde_json::from_value(params).map_err(|err| AppError::InvalidParams(err.to_string()))
}
