use soilscan_auth_types::token::{IssuedToken, TokenKind, TokenService, TokenSubject};

use crate::domain::repository::UserRepository;
use crate::error::SoilServiceError;
use crate::infra::password::PasswordHashing;

// ── Login ─────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub hashing: PasswordHashing,
    pub tokens: TokenService,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, SoilServiceError> {
        let user = self
            .users
            .find_by_email(input.email.trim())
            .await?
            .ok_or(SoilServiceError::InvalidCredentials)?;

        let matches = self
            .hashing
            .verify(input.password, user.password_hash.clone())
            .await
            .map_err(|e| SoilServiceError::Internal(e.context("verify password")))?;
        if !matches {
            return Err(SoilServiceError::InvalidCredentials);
        }
        if !user.verified {
            return Err(SoilServiceError::UnverifiedAccount);
        }

        let subject = TokenSubject {
            email: user.email,
            user_id: user.id,
        };
        Ok(LoginOutput {
            access: self.tokens.issue_access(&subject)?,
            refresh: self.tokens.issue_refresh(&subject)?,
        })
    }
}

// ── Refresh ──────────────────────────────────────────────────────────────────

/// Mint a new access token from a refresh token.
///
/// The refresh token itself is neither rotated nor revoked, and the account is not
/// re-read: a valid signature and an unexpired `exp` are sufficient.
pub struct RefreshUseCase {
    pub tokens: TokenService,
}

impl RefreshUseCase {
    pub fn execute(&self, refresh_token: Option<&str>) -> Result<IssuedToken, SoilServiceError> {
        let token = refresh_token.ok_or(SoilServiceError::InvalidRefreshToken)?;
        let claims = self.tokens.decode(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(SoilServiceError::WrongTokenType);
        }
        let subject = TokenSubject {
            email: claims.sub,
            user_id: claims.user_id,
        };
        Ok(self.tokens.issue_access(&subject)?)
    }
}
