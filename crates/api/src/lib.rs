//! Performance-statistics API server library.
//!
//! Exposes config, state, error handling, extractors and routes so that
//! integration tests and the binary entrypoint share the same building blocks.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod scope;
pub mod state;
