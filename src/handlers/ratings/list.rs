use axum::{extract::Query, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::format;
use crate::api::pagination::PageParams;
use crate::error::ApiError;
use crate::services::RatingService;

#[derive(Debug, Deserialize)]
pub struct ListRatingsQuery {
    pub media_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /api/ratings - List ratings, newest first
///
/// Query Parameters:
/// - media_id: filter by media item
/// - user_id: filter by rater
/// - page (default 1), per_page (default 10, max 100)
pub async fn rating_list(Query(query): Query<ListRatingsQuery>) -> Result<Json<Value>, ApiError> {
    let page = PageParams::resolve(query.page, query.per_page)?;

    let service = RatingService::new().await?;
    let (items, page_info) = service
        .list_ratings(query.media_id, query.user_id, page)
        .await?;

    let ratings: Vec<Value> = items.iter().map(format::rating_detail).collect();

    Ok(Json(json!({
        "ratings": ratings,
        "pagination": page_info,
    })))
}
