use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::VerificationCache;
use crate::error::SoilServiceError;

#[derive(Clone)]
pub struct RedisVerificationCache {
    pub pool: Pool,
}

fn verification_key(email: &str) -> String {
    format!("verification:{email}")
}

impl VerificationCache for RedisVerificationCache {
    async fn put(&self, email: &str, code: &str, ttl_secs: u64) -> Result<(), SoilServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SoilServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(verification_key(email), code, ttl_secs)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| SoilServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<String>, SoilServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SoilServiceError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get(verification_key(email))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| SoilServiceError::Internal(e.into()))?;
        Ok(value)
    }
}
