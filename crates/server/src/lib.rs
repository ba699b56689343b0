//! Tool server for the video metadata catalog.
//!
//! Exposes the catalog as JSON-RPC tools over stdio or HTTP. Both transports
//! share [`mcp::handler::handle_message`].

pub mod config;
pub mod error;
pub mod mcp;
pub mod router;
pub mod routes;
pub mod state;
