use vidcat_core::error::CoreError;

use crate::mcp::protocol::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

/// Application-level error type for tool calls and JSON-RPC methods.
///
/// Wraps [`CoreError`] for domain errors and adds protocol-specific variants.
/// Each variant maps to a JSON-RPC error code, or to an `isError` tool result
/// for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vidcat_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Tool arguments that do not fit the tool's schema.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Unknown JSON-RPC method or tool name.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether this error is reported inside a successful tool result
    /// (`isError: true`) rather than as a protocol error.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            AppError::Core(CoreError::InvalidMetadata(_) | CoreError::Validation(_))
        )
    }

    /// The JSON-RPC error code for this error.
    pub fn rpc_code(&self) -> i32 {
        match self {
            AppError::Core(_) | AppError::InvalidParams(_) => INVALID_PARAMS,
            AppError::MethodNotFound(_) => METHOD_NOT_FOUND,
            AppError::Database(_) | AppError::InternalError(_) => INTERNAL_ERROR,
        }
    }

    /// The message sent to the client. Store errors pass through with the
    /// driver's own message; server faults are logged at error level.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
            _ => {}
        }
        self.to_string()
    }
}
