#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use vidcat_server::config::{ServerConfig, Transport};
use vidcat_server::router::build_app_router;
use vidcat_server::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        transport: Transport::Http,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
    }
}

/// Build the HTTP transport with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(test_state(pool), &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a JSON-RPC request to `/mcp` and return the parsed response.
pub async fn rpc(app: Router, id: i64, method: &str, params: Value) -> Value {
    let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
    body_json(post_json(app, "/mcp", &body).await).await
}

/// Call a tool and return its result object (`content` + `isError`).
pub async fn call_tool(app: Router, name: &str, arguments: Value) -> Value {
    let response = rpc(app, 1, "tools/call", json!({ "name": name, "arguments": arguments })).await;
    assert!(response.get("error").is_none(), "unexpected error: {response}");
    response["result"].clone()
}

/// The text payload of a tool result.
pub fn tool_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap()
}

/// The text payload of a tool result, parsed as JSON.
pub fn tool_json(result: &Value) -> Value {
    serde_json::from_str(tool_text(result)).unwrap()
}
