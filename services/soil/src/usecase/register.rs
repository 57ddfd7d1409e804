use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{EmailNotifier, UserRepository, VerificationCache};
use crate::domain::types::User;
use crate::error::SoilServiceError;
use crate::infra::password::PasswordHashing;
use crate::usecase::verification::IssueCodeUseCase;

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Create an unverified account and send its first verification code.
///
/// The user row is written before mail goes out. If delivery fails the account
/// exists unverified and the caller can recover through resend.
pub struct RegisterUseCase<U: UserRepository, C: VerificationCache, N: EmailNotifier> {
    pub users: U,
    pub hashing: PasswordHashing,
    pub verification: IssueCodeUseCase<C, N>,
}

impl<U, C, N> RegisterUseCase<U, C, N>
where
    U: UserRepository,
    C: VerificationCache,
    N: EmailNotifier,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, SoilServiceError> {
        let username = input.username.trim();
        let email = input.email.trim();
        if username.is_empty() {
            return Err(SoilServiceError::InvalidInput("username is required".into()));
        }
        if !looks_like_email(email) {
            return Err(SoilServiceError::InvalidInput("email is not valid".into()));
        }
        if input.password.is_empty() {
            return Err(SoilServiceError::InvalidInput("password is required".into()));
        }

        let password_hash = self
            .hashing
            .hash(input.password)
            .await
            .map_err(|e| SoilServiceError::Internal(e.context("hash password")))?;

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash,
            verified: false,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, "user registered");

        self.verification.execute(&user.email).await?;
        Ok(user)
    }
}

/// `local@domain.tld` shape only; deliverability is proven by the code.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
