// src/handlers/users.rs

use std::sync::Arc;

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use super::extract::ValidatedJson;
use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, NewUser, RegisterRequest, User},
    response::ApiResponse,
    services::UsersService,
    utils::session::{removal_cookie, session_cookie, sign_session},
};

/// Registers a new user.
///
/// Returns 201 Created and the stored user (without the password hash), or
/// 409 if the email or username is taken.
pub async fn register(
    State(users): State<Arc<dyn UsersService>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let user = NewUser {
        email: payload.email,
        username: payload.username,
    };
    let user = users.register(user, &payload.password).await?;

    Ok(ApiResponse::created("Registered!", user))
}

/// Authenticates a user and starts a cookie session.
pub async fn login(
    State(users): State<Arc<dyn UsersService>>,
    State(config): State<Config>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<User>), AppError> {
    let user = users.login(&payload.email, &payload.password).await?;

    let token = sign_session(user.id, &config.session_secret, config.session_ttl)?;
    let jar = jar.add(session_cookie(token, &config));

    Ok((jar, ApiResponse::ok_data("Logged in!", user)))
}

/// Ends the session by clearing the cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse) {
    (jar.remove(removal_cookie()), ApiResponse::ok("Logged out!"))
}
