pub mod accounts;
pub mod auth;
pub mod oauth;
pub mod posts;

use std::sync::Arc;

use axum::Router;

use crate::AppState;

/// All `/api` routes
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(accounts::routes())
        .merge(posts::routes())
        .merge(oauth::routes())
}
