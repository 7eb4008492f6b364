//! Authentication extractors.
//!
//! Credentials arrive three ways: an `Authorization: Bearer` token for the
//! JSON API, an `Authorization: Basic` pair for the login endpoint, and a
//! session cookie for the website. Each becomes an extractor that resolves
//! to the authenticated [`User`] (or an explicit rejection value); handlers
//! never inspect headers themselves.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use tracing::warn;

use til_core::{TokenRepository, User};

use crate::error::ApiError;
use crate::AppState;

/// Name of the website session cookie. Its value is a bearer token from the
/// tokens table, so API and website credentials share one lifecycle.
pub const SESSION_COOKIE: &str = "til_session";

/// Name of the short-lived cookie pinning the OAuth `state` value between
/// the redirect to Google and the callback.
pub const OAUTH_STATE_COOKIE: &str = "til_oauth_state";

/// Extractor requiring a valid API bearer token.
#[derive(Debug, Clone)]
pub struct ApiUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization scheme".to_string()))?
            .trim();

        let user = state
            .db
            .tokens
            .find_user_by_value(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        Ok(ApiUser(user))
    }
}

/// Username/password pair decoded from an `Authorization: Basic` header.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Decode `Basic <base64(user:pass)>`. Returns None on any malformation.
pub fn parse_basic_header(header: &str) -> Option<BasicCredentials> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BasicCredentials {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic_header)
            .ok_or_else(|| ApiError::Unauthorized("Basic authentication required".to_string()))
    }
}

/// Rejection for website routes: browsers get sent to the login form
/// instead of a bare 401.
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Extractor requiring a live website session.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = LoginRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Some(user) => Ok(SessionUser(user)),
            None => Err(LoginRedirect),
        }
    }
}

/// Extractor for pages that render either way but adapt to a session.
#[derive(Debug, Clone)]
pub struct MaybeSessionUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeSessionUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSessionUser(session_user(parts, state).await))
    }
}

async fn session_user(parts: &Parts, state: &AppState) -> Option<User> {
    let jar = CookieJar::from_headers(&parts.headers);
    let value = jar.get(SESSION_COOKIE)?.value().to_string();
    resolve_session(state.db.tokens.find_user_by_value(&value).await)
}

/// Failed lookups are logged, then treated as no session; a store outage
/// must not silently read as "logged out".
fn resolve_session(lookup: til_core::Result<Option<User>>) -> Option<User> {
    match lookup {
        Ok(user) => user,
        Err(err) => {
            warn!(
                subsystem = "auth",
                component = "session",
                error = %err,
                "Session token lookup failed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_header_round_trip() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("timbl:password");
        let creds = parse_basic_header(&format!("Basic {}", encoded)).unwrap();
        assert_eq!(creds.username, "timbl");
        assert_eq!(creds.password, "password");
    }

    #[test]
    fn test_parse_basic_header_password_may_contain_colon() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("timbl:pa:ss");
        let creds = parse_basic_header(&format!("Basic {}", encoded)).unwrap();
        assert_eq!(creds.password, "pa:ss");
    }

    #[test]
    fn test_parse_basic_header_rejects_wrong_scheme() {
        assert!(parse_basic_header("Bearer abc").is_none());
    }

    #[test]
    fn test_parse_basic_header_rejects_bad_base64() {
        assert!(parse_basic_header("Basic !!!not-base64!!!").is_none());
    }

    #[test]
    fn test_parse_basic_header_rejects_missing_separator() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("no-colon-here");
        assert!(parse_basic_header(&format!("Basic {}", encoded)).is_none());
    }

    #[test]
    fn test_resolve_session_passes_through_lookup() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Tim".to_string(),
            username: "timbl".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            email: "tim@example.com".to_string(),
            profile_picture: None,
            google_identity: None,
            created_at: chrono::Utc::now(),
        };
        assert!(resolve_session(Ok(Some(user))).is_some());
        assert!(resolve_session(Ok(None)).is_none());
    }

    #[test]
    fn test_resolve_session_treats_lookup_failure_as_absent() {
        let err = til_core::Error::Database(sqlx::Error::PoolTimedOut);
        assert!(resolve_session(Err(err)).is_none());
    }
}
