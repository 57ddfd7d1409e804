//! Bearer credentials for router tests.
//!
//! Mints real signed tokens from a [`TokenService`] so requests pass through the
//! same extractor production traffic does.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use chrono::{Duration, Utc};
use soilscan_auth_types::token::{TokenKind, TokenService, TokenSubject};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "soilscan-test-secret";

/// A token service with the default TTLs and a fixed test secret.
pub fn test_token_service() -> TokenService {
    TokenService::new(
        TEST_JWT_SECRET,
        "HS256",
        Duration::minutes(30),
        Duration::days(7),
    )
    .unwrap()
}

/// Identity to authenticate test requests as.
pub struct MockAuth {
    pub subject: TokenSubject,
    tokens: TokenService,
}

impl MockAuth {
    pub fn new(tokens: TokenService, email: &str, user_id: Uuid) -> Self {
        Self {
            subject: TokenSubject {
                email: email.to_owned(),
                user_id,
            },
            tokens,
        }
    }

    /// A signed token of `kind` that expires after `ttl` from now.
    pub fn token(&self, kind: TokenKind, ttl: Duration) -> String {
        self.tokens.issue(&self.subject, kind, ttl).unwrap().token
    }

    /// A token that expired an hour ago.
    pub fn expired_token(&self, kind: TokenKind) -> String {
        let issued_at = Utc::now() - Duration::hours(2);
        self.tokens
            .issue_at(&self.subject, kind, Duration::hours(1), issued_at)
            .unwrap()
            .token
    }

    /// `Authorization: Bearer <access token>`.
    pub fn headers(&self) -> HeaderMap {
        self.headers_for(TokenKind::Access)
    }

    /// `Authorization: Bearer <token of kind>`.
    pub fn headers_for(&self, kind: TokenKind) -> HeaderMap {
        bearer_headers(&self.token(kind, Duration::minutes(30)))
    }
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    map
}
