//! `Authorization: Bearer <token>` parsing.

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("missing authorization header")]
    Missing,
    #[error("authorization header is not a bearer credential")]
    NotBearer,
}

/// Extract the token from a raw `Authorization` value.
///
/// The scheme is matched case-insensitively and the token must be non-empty.
///
/// ```
/// use soilscan_auth_types::bearer::{CredentialError, parse_bearer};
///
/// assert_eq!(parse_bearer("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
/// assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), Err(CredentialError::NotBearer));
/// ```
pub fn parse_bearer(raw: &str) -> Result<&str, CredentialError> {
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or(CredentialError::NotBearer)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(CredentialError::NotBearer);
    }
    Ok(token)
}

/// [`parse_bearer`] for a header that may be absent.
pub fn parse_authorization(raw: Option<&str>) -> Result<&str, CredentialError> {
    parse_bearer(raw.ok_or(CredentialError::Missing)?)
}
