//! Auth types shared across Soilscan crates.
//!
//! Provides the token service, bearer-credential parsing and the refresh cookie builder.

pub mod bearer;
pub mod cookie;
pub mod token;
