//! HTTP facade translating requests into resolver calls.
//!
//! - [`dto`] - Query and response types
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request processing middleware
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
