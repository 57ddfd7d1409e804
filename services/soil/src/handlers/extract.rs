use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::types::User;
use crate::error::SoilServiceError;
use crate::state::AppState;
use crate::usecase::gateway::ResolveIdentityUseCase;

/// The verified account behind the request's bearer access token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = SoilServiceError;

    // The returned future owns the header value and the use case.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let usecase = ResolveIdentityUseCase {
            users: state.user_repo(),
            tokens: state.tokens.clone(),
        };

        async move { usecase.execute(authorization.as_deref()).await.map(Self) }
    }
}
