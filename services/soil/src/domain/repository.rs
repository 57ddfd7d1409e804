#![allow(async_fn_in_trait)]

use std::path::{Path, PathBuf};

use uuid::Uuid;

use soilscan_domain::pagination::OffsetPage;

use crate::domain::types::{AnalysisRecord, SoilPrediction, User};
use crate::error::SoilServiceError;

/// Account storage.
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken email yields `EmailAlreadyExists`.
    async fn create(&self, user: &User) -> Result<(), SoilServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, SoilServiceError>;

    /// Set `verified = true`. Returns `false` when no such user exists.
    async fn mark_verified(&self, email: &str) -> Result<bool, SoilServiceError>;
}

/// Analysis storage. Every query is scoped by owner.
pub trait AnalysisRepository: Send + Sync {
    async fn create(&self, record: &AnalysisRecord) -> Result<(), SoilServiceError>;

    /// Owner's records, newest first. `page` is applied as given; callers bound it.
    async fn list(
        &self,
        user_id: Uuid,
        page: OffsetPage,
    ) -> Result<Vec<AnalysisRecord>, SoilServiceError>;

    async fn count(&self, user_id: Uuid) -> Result<u64, SoilServiceError>;

    async fn find(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AnalysisRecord>, SoilServiceError>;

    /// Delete a record. Returns `true` if deleted, `false` if absent or not owned.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, SoilServiceError>;
}

/// Short-lived verification codes keyed by email (Redis, TTL).
pub trait VerificationCache: Send + Sync {
    /// Store `code`, replacing any live entry and resetting its TTL.
    async fn put(&self, email: &str, code: &str, ttl_secs: u64) -> Result<(), SoilServiceError>;

    async fn get(&self, email: &str) -> Result<Option<String>, SoilServiceError>;
}

/// Outbound verification mail.
pub trait EmailNotifier: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

/// Soil image classifier.
///
/// Implementations that do CPU-bound work must move it off the async workers
/// (`tokio::task::spawn_blocking`).
pub trait InferenceEngine: Send + Sync {
    async fn predict(&self, image: &Path) -> anyhow::Result<SoilPrediction>;
}

/// Uploaded image files, addressed by storage key.
pub trait ImageStore: Send + Sync {
    /// Write `bytes` under `key`, returning the full path.
    async fn save(&self, key: &str, bytes: &[u8]) -> anyhow::Result<PathBuf>;

    /// `None` when no file is stored under `key`.
    async fn read(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
