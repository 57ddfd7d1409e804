//! Domain types shared across Soilscan crates.
//!
//! Pure types only; no framework dependencies.

pub mod media;
pub mod pagination;
