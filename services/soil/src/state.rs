use std::time::Duration;

use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use soilscan_auth_types::token::TokenService;

use crate::domain::types::UploadPolicy;
use crate::infra::cache::RedisVerificationCache;
use crate::infra::db::{DbAnalysisRepository, DbUserRepository};
use crate::infra::inference::HttpInferenceEngine;
use crate::infra::mailer::Mailer;
use crate::infra::password::PasswordHashing;
use crate::infra::storage::FsImageStore;
use crate::usecase::verification::IssueCodeUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub tokens: TokenService,
    pub hashing: PasswordHashing,
    pub images: FsImageStore,
    pub engine: HttpInferenceEngine,
    pub mailer: Mailer,
    pub upload_policy: UploadPolicy,
    pub inference_timeout: Duration,
    pub notify_timeout: Duration,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn analysis_repo(&self) -> DbAnalysisRepository {
        DbAnalysisRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_cache(&self) -> RedisVerificationCache {
        RedisVerificationCache {
            pool: self.redis.clone(),
        }
    }

    /// Issue (and resend) verification codes.
    pub fn issue_code(&self) -> IssueCodeUseCase<RedisVerificationCache, Mailer> {
        IssueCodeUseCase {
            codes: self.verification_cache(),
            notifier: self.mailer.clone(),
            notify_timeout: self.notify_timeout,
        }
    }
}
