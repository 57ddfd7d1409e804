//! Test utilities for Soilscan services.
//!
//! Provides bearer-token minting and scratch upload directories.
//! Import in test targets only; never in production code.

pub mod auth;
pub mod fixture;
