//! `GET /health` for the HTTP transport.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::mcp::handler::SERVER_NAME;
use crate::state::AppState;

/// Connection pool occupancy at the time of the check.
#[derive(Debug, Serialize)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the catalog store answers, `degraded` otherwise.
    pub status: &'static str,
    pub server: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub pool: PoolStatus,
}

impl HealthResponse {
    fn from_probe(db_healthy: bool, pool: PoolStatus) -> Self {
        Self {
            status: if db_healthy { "ok" } else { "degraded" },
            server: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            pool,
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match vidcat_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Catalog store unreachable");
            false
        }
    };

    let pool = PoolStatus {
        size: state.pool.size(),
        idle: state.pool.num_idle(),
        max_connections: state.pool.options().get_max_connections(),
    };

    Json(HealthResponse::from_probe(db_healthy, pool))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
