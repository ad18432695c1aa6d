//! Connected account endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use libcrosspost::{AccountUpdate, ConnectedAccount, NewConnectedAccount, Platform};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/accounts", get(list_accounts).post(create_account))
        .route(
            "/api/accounts/{id}",
            patch(update_account).delete(delete_account),
        )
        .route("/api/accounts/connect-demo/{platform}", post(connect_demo))
}

/// GET /api/accounts
async fn list_accounts(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ConnectedAccount>>, ApiError> {
    let accounts = state.service.accounts().list(&user.id).await?;
    Ok(Json(accounts))
}

/// POST /api/accounts
async fn create_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<NewConnectedAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<ConnectedAccount>), ApiError> {
    let Json(account) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state.service.accounts().create(&user.id, account).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/accounts/{id}
async fn update_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<AccountUpdate>, JsonRejection>,
) -> Result<Json<ConnectedAccount>, ApiError> {
    let Json(update) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let updated = state.service.accounts().update(&user.id, &id, update).await?;
    Ok(Json(updated))
}

/// DELETE /api/accounts/{id}
async fn delete_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.accounts().disconnect(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/accounts/connect-demo/{platform} - stands in for an OAuth flow
async fn connect_demo(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(platform): Path<String>,
) -> Result<(StatusCode, Json<ConnectedAccount>), ApiError> {
    let platform: Platform = platform.parse().map_err(ApiError::BadRequest)?;
    let account = state
        .service
        .accounts()
        .connect_demo(&user.id, platform)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}
