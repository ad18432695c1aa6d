//! Login, logout, and the current user

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use libcrosspost::{CrosspostError, UpsertUser, User};
use tracing::info;

use crate::auth::{removal_cookie, session_cookie, session_token, AuthUser};
use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/user", get(current_user))
}

/// POST /api/auth/login - trust the posted identity claims and open a session
///
/// Only available with `auth.dev_login`; a real deployment puts an identity
/// provider in front of this.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<UpsertUser>, JsonRejection>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    if !state.service.config().auth.dev_login {
        return Err(CrosspostError::NotFound("Not found".to_string()).into());
    }

    let Json(claims) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if claims.id.trim().is_empty() {
        return Err(ApiError::BadRequest("id is required".to_string()));
    }

    let (user, token) = state.service.sessions().login(&claims).await?;
    info!(user_id = %user.id, "User logged in");

    Ok((jar.add(session_cookie(&state, token)), Json(user)))
}

/// POST /api/auth/logout - end the session and clear the cookie
async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(token) = session_token(&jar, &state) {
        state.service.sessions().logout(&token).await?;
    }
    info!(user_id = %user.id, "User logged out");

    Ok((jar.remove(removal_cookie(&state)), StatusCode::NO_CONTENT))
}

/// GET /api/auth/user
async fn current_user(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
