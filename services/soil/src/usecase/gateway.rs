use soilscan_auth_types::bearer::parse_authorization;
use soilscan_auth_types::token::{TokenKind, TokenService};

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::SoilServiceError;

/// Resolve an `Authorization` header value to a verified user.
pub struct ResolveIdentityUseCase<U: UserRepository> {
    pub users: U,
    pub tokens: TokenService,
}

impl<U: UserRepository> ResolveIdentityUseCase<U> {
    pub async fn execute(&self, authorization: Option<&str>) -> Result<User, SoilServiceError> {
        let token =
            parse_authorization(authorization).map_err(|_| SoilServiceError::MalformedCredential)?;
        let claims = self.tokens.decode(token)?;
        if claims.kind != TokenKind::Access {
            return Err(SoilServiceError::WrongTokenType);
        }
        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(SoilServiceError::UnknownUser)?;
        if !user.verified {
            return Err(SoilServiceError::UnverifiedAccount);
        }
        Ok(user)
    }
}
