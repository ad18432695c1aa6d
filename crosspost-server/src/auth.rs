//! Session cookie handling and the authenticated-user extractor

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use libcrosspost::User;

use crate::error::ApiError;
use crate::AppState;

/// Extractor that resolves the session cookie to its user
///
/// Rejects with 401 when the cookie is missing, unknown, or expired.
pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar, state).ok_or(ApiError::Unauthorized)?;

        let user = state
            .service
            .sessions()
            .authenticate(&token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

/// Raw session token from the request cookies, if any
pub fn session_token(jar: &CookieJar, state: &AppState) -> Option<String> {
    jar.get(&state.service.config().auth.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// HttpOnly cookie carrying a fresh session token
pub fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let auth = &state.service.config().auth;
    let max_age = time::Duration::seconds(auth.session_ttl.as_secs() as i64);

    Cookie::build((auth.cookie_name.clone(), token))
        .http_only(true)
        .secure(auth.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Cookie that, once removed from the jar, clears the session on the client
pub fn removal_cookie(state: &AppState) -> Cookie<'static> {
    Cookie::build((state.service.config().auth.cookie_name.clone(), String::new()))
        .path("/")
        .build()
}
