use std::time::Duration;

use anyhow::anyhow;
use rand::RngExt;

use crate::domain::repository::{EmailNotifier, UserRepository, VerificationCache};
use crate::domain::types::{VERIFICATION_CODE_LEN, VERIFICATION_CODE_TTL_SECS};
use crate::error::SoilServiceError;

/// Six decimal digits, zero-padded.
pub fn generate_code() -> String {
    let upper = 10u32.pow(VERIFICATION_CODE_LEN as u32);
    let n = rand::rng().random_range(0..upper);
    format!("{n:0width$}", width = VERIFICATION_CODE_LEN)
}

// ── Issue / resend ───────────────────────────────────────────────────────────

/// Store a fresh code (replacing any live one) and mail it.
///
/// The code stays stored when delivery fails, so a later resend or a code that did
/// arrive late still works.
pub struct IssueCodeUseCase<C: VerificationCache, N: EmailNotifier> {
    pub codes: C,
    pub notifier: N,
    pub notify_timeout: Duration,
}

impl<C: VerificationCache, N: EmailNotifier> IssueCodeUseCase<C, N> {
    pub async fn execute(&self, email: &str) -> Result<(), SoilServiceError> {
        let code = generate_code();
        self.codes
            .put(email, &code, VERIFICATION_CODE_TTL_SECS)
            .await?;

        match tokio::time::timeout(
            self.notify_timeout,
            self.notifier.send_verification_code(email, &code),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SoilServiceError::NotificationFailure(e)),
            Err(_) => Err(SoilServiceError::NotificationFailure(anyhow!(
                "mail delivery timed out after {:?}",
                self.notify_timeout
            ))),
        }
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

pub struct VerifyCodeUseCase<U: UserRepository, C: VerificationCache> {
    pub users: U,
    pub codes: C,
}

impl<U: UserRepository, C: VerificationCache> VerifyCodeUseCase<U, C> {
    /// Accept `code` if it equals the live code for `email`; marks the user verified.
    ///
    /// The code is not consumed, so repeating a successful check succeeds again.
    pub async fn execute(&self, email: &str, code: &str) -> Result<(), SoilServiceError> {
        let stored = self.codes.get(email).await?;
        if stored.as_deref() != Some(code.trim()) {
            return Err(SoilServiceError::InvalidCode);
        }
        if !self.users.mark_verified(email).await? {
            return Err(SoilServiceError::InvalidCode);
        }
        tracing::info!(email, "account verified");
        Ok(())
    }
}
