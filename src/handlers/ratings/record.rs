use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{double_option, format};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::rating_service::RatingPatch;
use crate::services::RatingService;

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub score: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub comment: Option<Option<String>>,
}

/// GET /api/ratings/:rating_id - Single rating with rater and media summaries
pub async fn rating_get(Path(rating_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let rating_id = parse_rating_id(&rating_id)?;

    let service = RatingService::new().await?;
    let detail = service.get_rating(rating_id).await?;

    Ok(Json(json!({
        "rating": format::rating_detail(&detail),
    })))
}

/// PUT /api/ratings/:rating_id - Update score and/or comment (creator only)
///
/// At least one field must be supplied; an explicit null clears the comment.
pub async fn rating_put(
    Extension(auth): Extension<AuthUser>,
    Path(rating_id): Path<String>,
    Json(payload): Json<UpdateRatingRequest>,
) -> Result<Json<Value>, ApiError> {
    let rating_id = parse_rating_id(&rating_id)?;

    let patch = RatingPatch {
        score: payload.score,
        comment: payload.comment,
    };

    let service = RatingService::new().await?;
    let detail = service.update_rating(rating_id, auth.user_id, patch).await?;

    Ok(Json(json!({
        "message": "Rating updated successfully",
        "rating": format::rating_detail(&detail),
    })))
}

/// DELETE /api/ratings/:rating_id - Delete a rating (creator only)
pub async fn rating_delete(
    Extension(auth): Extension<AuthUser>,
    Path(rating_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let rating_id = parse_rating_id(&rating_id)?;

    let service = RatingService::new().await?;
    service.delete_rating(rating_id, auth.user_id).await?;

    Ok(Json(json!({
        "message": "Rating deleted successfully",
    })))
}

fn parse_rating_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid rating id"))
}
