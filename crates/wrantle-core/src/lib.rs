//! HTTP plumbing shared by Wrantle services.
//!
//! Error rendering, health probes, request-id/trace layers, tracing setup and
//! environment-driven configuration.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
