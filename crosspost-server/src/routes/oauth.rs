//! OAuth callback placeholder
//!
//! Real token exchange is not wired up; the callback only bounces the browser
//! back to the accounts page with the outcome in the query string.

use std::sync::Arc;

use axum::extract::Path;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use libcrosspost::Platform;
use tracing::info;

use crate::auth::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/oauth/{platform}/callback", get(callback))
}

/// GET /api/oauth/{platform}/callback
async fn callback(AuthUser(user): AuthUser, Path(platform): Path<String>) -> Redirect {
    match platform.parse::<Platform>() {
        Ok(platform) => {
            info!(user_id = %user.id, platform = %platform, "OAuth callback");
            Redirect::to(&format!("/accounts?connected={}", platform))
        }
        Err(_) => Redirect::to("/accounts?error=oauth_failed"),
    }
}
