//! Read-only query API over the clean table.
//!
//! - [`service`]: credential check and table loading, independent of HTTP
//! - [`http`]: axum router, error mapping, and the server loop

pub mod http;
pub mod service;
