//! Shared plumbing for Rolegate services: tracing, config loading, HTTP errors,
//! health handlers, request-id middleware and the internal-caller extractor.

pub mod config;
pub mod error;
pub mod health;
pub mod internal;
pub mod middleware;
pub mod serde;
pub mod tracing;
