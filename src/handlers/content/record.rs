use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{double_option, format};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::content_service::ContentPatch;
use crate::services::ContentService;

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail_url: Option<Option<String>>,
    pub content_url: Option<String>,
}

/// GET /api/content/:media_id - Single media item with creator and stats
pub async fn content_get(Path(media_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let media_id = parse_media_id(&media_id)?;

    let service = ContentService::new().await?;
    let detail = service.get_content(media_id).await?;

    Ok(Json(json!({
        "content": format::content_detail(&detail),
    })))
}

/// PUT /api/content/:media_id - Update media content (owner only)
///
/// Accepts any subset of title, description, category, thumbnail_url and
/// content_url; at least one must be present. An explicit null clears the
/// nullable fields.
pub async fn content_put(
    Extension(auth): Extension<AuthUser>,
    Path(media_id): Path<String>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<Json<Value>, ApiError> {
    let media_id = parse_media_id(&media_id)?;

    let patch = ContentPatch {
        title: payload.title,
        description: payload.description,
        category: payload.category,
        thumbnail_url: payload.thumbnail_url,
        content_url: payload.content_url,
    };

    let service = ContentService::new().await?;
    let detail = service.update_content(media_id, auth.user_id, patch).await?;

    Ok(Json(json!({
        "message": "Content updated successfully",
        "content": format::content_detail(&detail),
    })))
}

/// DELETE /api/content/:media_id - Delete media content (owner only)
///
/// Cascades to the item's ratings; the owner's received-rating counter is
/// decremented by the number of cascaded ratings in the same transaction.
pub async fn content_delete(
    Extension(auth): Extension<AuthUser>,
    Path(media_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let media_id = parse_media_id(&media_id)?;

    let service = ContentService::new().await?;
    service.delete_content(media_id, auth.user_id).await?;

    Ok(Json(json!({
        "message": "Content deleted successfully",
    })))
}

fn parse_media_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid media id"))
}
