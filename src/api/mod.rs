//! API server implementation
//!
//! Provides the REST endpoints in front of the proxy identity subsystem.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};

#[cfg(test)]
pub(crate) mod test_support;
