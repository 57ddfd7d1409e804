//! Refresh-token cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Path the refresh cookie is scoped to; only the identity routes receive it.
pub const REFRESH_TOKEN_PATH: &str = "/api/v1/users";

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use soilscan_auth_types::cookie::{set_refresh_token_cookie, REFRESH_TOKEN_COOKIE};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), 604800, true);
/// let cookie = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
/// assert_eq!(cookie.path(), Some("/api/v1/users"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(
    jar: CookieJar,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> CookieJar {
    let cookie = Cookie::build((REFRESH_TOKEN_COOKIE, value))
        .path(REFRESH_TOKEN_PATH)
        .max_age(Duration::seconds(max_age_secs))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Read the refresh token, if the cookie is present and non-empty.
pub fn refresh_token(jar: &CookieJar) -> Option<&str> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
}
