//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Upper bound for `limit`; larger requests are clamped.
pub const MAX_LIMIT: u64 = 100;

/// Default page size when `limit` is absent.
pub const DEFAULT_LIMIT: u64 = 50;

/// Offset pagination parameters (`?limit=&offset=`).
///
/// - `limit`: 1–100, default 50
/// - `offset`: ≥ 0, default 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPage {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for OffsetPage {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl OffsetPage {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Clamp `limit` to the valid range 1–100.
    ///
    /// Call after deserializing from query params to enforce bounds.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_LIMIT),
            offset: self.offset,
        }
    }
}
