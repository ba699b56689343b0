use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared state handed to every request, whichever transport delivered it.
///
/// Cheap to clone: the pool is reference-counted internally and the config
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vidcat_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
