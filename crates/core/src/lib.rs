//! Pure domain logic for the video metadata catalog.
//!
//! Nothing in this crate touches the database or the network: it defines the
//! filter and query-option models, composes parameterized SQL from them,
//! validates incoming records, and normalizes raw column values back into
//! typed data.

pub mod error;
pub mod filter;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod query_options;
pub mod stats;
pub mod types;
pub mod validation;
