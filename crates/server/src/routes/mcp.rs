//! HTTP transport: one JSON-RPC message per `POST /mcp`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::mcp::handler::handle_message;
use crate::state::AppState;

/// POST /mcp
///
/// The body is read as raw text so malformed JSON still gets a JSON-RPC
/// parse error instead of an extractor rejection. Notifications are
/// acknowledged with `202 Accepted` and an empty body.
async fn handle_rpc(State(state): State<AppState>, body: String) -> Response {
    match handle_message(&state, &body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/mcp", post(handle_rpc))
}
