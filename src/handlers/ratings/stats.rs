use axum::{extract::Path, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::RatingService;

/// GET /api/ratings/media/:media_id/stats - Rating statistics for one item
///
/// Expected Output:
/// ```json
/// {
///   "media_id": "uuid",
///   "media_title": "string",
///   "stats": {
///     "total_ratings": 3,
///     "average_rating": 4.67,
///     "rating_distribution": { "1": 0, "2": 0, "3": 0, "4": 1, "5": 2 }
///   }
/// }
/// ```
///
/// Stats are computed from live ledger rows inside the request, so any
/// committed rating mutation is visible to the next call.
pub async fn media_stats(Path(media_id): Path<String>) -> Result<Json<Value>, ApiError> {
    let media_id =
        Uuid::parse_str(&media_id).map_err(|_| ApiError::bad_request("Invalid media id"))?;

    let service = RatingService::new().await?;
    let (media_title, stats) = service.compute_stats(media_id).await?;

    Ok(Json(json!({
        "media_id": media_id,
        "media_title": media_title,
        "stats": stats,
    })))
}
