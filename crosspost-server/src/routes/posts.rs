//! Post history and the publish endpoint

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use libcrosspost::service::publishing::{PublishRequest, PublishResponse};
use libcrosspost::{ImageUpload, Platform, Post, PostWithResults};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/publish", post(publish))
        .route("/api/posts/{id}", get(get_post))
}

/// GET /api/posts
async fn list_posts(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.service.history().list_posts(&user.id).await?;
    Ok(Json(posts))
}

/// GET /api/posts/{id}
async fn get_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PostWithResults>, ApiError> {
    let post = state.service.history().get_post(&user.id, &id).await?;
    Ok(Json(post))
}

/// POST /api/posts/publish
///
/// Multipart form:
/// - "content": post text
/// - "platforms": JSON array of platform names
/// - "image" (optional): the image file, with its content type
async fn publish(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let form = read_publish_form(multipart).await?;

    let (content, platforms_json) = match (form.content, form.platforms) {
        (Some(content), Some(platforms)) if !content.is_empty() && !platforms.is_empty() => {
            (content, platforms)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Content and platforms are required".to_string(),
            ))
        }
    };

    let request = PublishRequest {
        user_id: user.id,
        content,
        platforms: parse_platforms(&platforms_json)?,
        image: form.image,
    };

    let response = state.service.publishing().publish(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Default)]
struct PublishForm {
    content: Option<String>,
    platforms: Option<String>,
    image: Option<ImageUpload>,
}

async fn read_publish_form(mut multipart: Multipart) -> Result<PublishForm, ApiError> {
    let mut form = PublishForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => {
                form.content = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?,
                );
            }
            "platforms" => {
                form.platforms = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?,
                );
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;

                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload::new(content_type, bytes.to_vec()));
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

fn parse_platforms(json: &str) -> Result<Vec<Platform>, ApiError> {
    let names: Vec<String> = serde_json::from_str(json)
        .map_err(|_| ApiError::BadRequest("Invalid platforms format".to_string()))?;

    names
        .iter()
        .map(|name| name.parse::<Platform>().map_err(ApiError::BadRequest))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platforms() {
        let platforms = parse_platforms(r#"["linkedin","twitter"]"#).unwrap();
        assert_eq!(platforms, vec![Platform::LinkedIn, Platform::Twitter]);
    }

    #[test]
    fn test_parse_platforms_rejects_garbage() {
        assert!(matches!(
            parse_platforms("linkedin"),
            Err(ApiError::BadRequest(msg)) if msg == "Invalid platforms format"
        ));
        assert!(matches!(
            parse_platforms(r#"["myspace"]"#),
            Err(ApiError::BadRequest(msg)) if msg.contains("myspace")
        ));
    }

    #[test]
    fn test_parse_platforms_empty_array_reaches_validation() {
        assert!(parse_platforms("[]").unwrap().is_empty());
    }
}
