// src/utils/session.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session";

/// Session token claims.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// The authenticated caller of a request.
///
/// Inserted into request extensions by [`require_session`]; handlers take it
/// as an extractor instead of looking up untyped context values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
}

/// Signs a session token for the user, valid for `ttl_seconds`.
pub fn sign_session(user_id: i64, secret: &str, ttl_seconds: u64) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::internal(e.to_string()))?
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: usize::try_from(now.saturating_add(ttl_seconds)).unwrap_or(usize::MAX),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(e.to_string()).with_op("session.sign"))
}

/// Verifies a session token and returns the session it stands for.
pub fn verify_session(token: &str, secret: &str) -> Result<Session, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::unauthorized("Invalid session"))?;

    let user_id = token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::unauthorized("Invalid session"))?;

    Ok(Session { user_id })
}

/// Builds the cookie handed out on login.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

/// Cookie used to clear the session on logout. Path must match the issued one.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Axum Middleware: Authentication.
///
/// Lets through only requests carrying a valid session cookie and attaches
/// the caller's [`Session`] to the request. Anything else is a 401.
pub async fn require_session(
    State(config): State<Config>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

    let session = verify_session(&token, &config.session_secret)?;
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .copied()
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn signed_session_verifies() {
        let token = sign_session(42, "secret", 60).unwrap();
        assert_eq!(verify_session(&token, "secret").unwrap(), Session { user_id: 42 });
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = sign_session(42, "secret", 60).unwrap();
        let err = verify_session(&token, "other").unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        assert!(verify_session("not.a.jwt", "secret").unwrap_err().is(ErrorKind::Unauthorized));
    }
}
