use axum::{http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::format;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::RatingService;

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub media_id: Option<Uuid>,
    pub score: Option<i32>,
    pub comment: Option<String>,
}

/// POST /api/ratings - Rate a media item
///
/// Expected Input:
/// ```json
/// {
///   "media_id": "uuid",
///   "score": 1-5,
///   "comment": "string (optional)"
/// }
/// ```
///
/// Returns 201 with the created rating; 400 when the score is out of range,
/// 404 when the media item does not exist, 409 when the caller has already
/// rated it (use PUT /api/ratings/:rating_id to change an existing rating).
pub async fn rating_create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (media_id, score) = require_rating_fields(&payload)?;

    let service = RatingService::new().await?;
    let detail = service
        .create_rating(auth.user_id, media_id, score, payload.comment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Rating created successfully",
            "rating": format::rating_detail(&detail),
        })),
    ))
}

fn require_rating_fields(payload: &CreateRatingRequest) -> Result<(Uuid, i32), ApiError> {
    let mut missing = HashMap::new();
    if payload.media_id.is_none() {
        missing.insert(
            "media_id".to_string(),
            "Missing data for required field".to_string(),
        );
    }
    if payload.score.is_none() {
        missing.insert(
            "score".to_string(),
            "Missing data for required field".to_string(),
        );
    }
    if !missing.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(missing)));
    }

    Ok((payload.media_id.unwrap(), payload.score.unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_and_score_are_required() {
        let payload = CreateRatingRequest {
            media_id: None,
            score: None,
            comment: Some("nice".to_string()),
        };
        let body = require_rating_fields(&payload).unwrap_err().to_json();
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["messages"].get("media_id").is_some());
        assert!(body["messages"].get("score").is_some());
    }
}
