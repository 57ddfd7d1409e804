//! Service plumbing shared by Soilscan binaries: config, health, request ids, tracing.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
