//! The JSON-RPC tool server: envelope types, the tool catalog, dispatch and
//! the stdio transport. The HTTP transport lives in `routes::mcp`.

pub mod args;
pub mod dispatch;
pub mod handler;
pub mod protocol;
pub mod resources;
pub mod stdio;
pub mod tools;
