use axum::{extract::Query, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::format;
use crate::api::pagination::PageParams;
use crate::database::models::MediaCategory;
use crate::error::ApiError;
use crate::services::content_service::{ContentFilter, ContentSort, SortOrder};
use crate::services::ContentService;

#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub user_id: Option<Uuid>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// GET /api/content - List media content
///
/// Query Parameters:
/// - page (default 1), per_page (default 10, max 100)
/// - category: game|video|artwork|music
/// - user_id: filter by owner
/// - search: case-insensitive substring over title and description
/// - sort_by: created_at|updated_at|title (default created_at)
/// - order: asc|desc (default desc)
pub async fn content_list(
    Query(query): Query<ListContentQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = PageParams::resolve(query.page, query.per_page)?;
    let filter = parse_filter(&query)?;

    let service = ContentService::new().await?;
    let (items, page_info) = service.list_content(&filter, page).await?;

    let content: Vec<Value> = items.iter().map(format::content_detail).collect();

    Ok(Json(json!({
        "content": content,
        "pagination": page_info,
    })))
}

fn parse_filter(query: &ListContentQuery) -> Result<ContentFilter, ApiError> {
    let mut errors = HashMap::new();

    let category = match &query.category {
        Some(raw) => match MediaCategory::parse(raw) {
            Some(category) => Some(category),
            None => {
                errors.insert(
                    "category".to_string(),
                    "Must be one of: game, video, artwork, music".to_string(),
                );
                None
            }
        },
        None => None,
    };

    let sort_by = match query.sort_by.as_deref() {
        None => ContentSort::CreatedAt,
        Some(raw) => match ContentSort::parse(raw) {
            Some(sort) => sort,
            None => {
                errors.insert(
                    "sort_by".to_string(),
                    format!("Must be one of: {}", ContentSort::ALLOWED.join(", ")),
                );
                ContentSort::CreatedAt
            }
        },
    };

    let order = match query.order.as_deref() {
        None => SortOrder::Desc,
        Some(raw) => match SortOrder::parse(raw) {
            Some(order) => order,
            None => {
                errors.insert("order".to_string(), "Must be one of: asc, desc".to_string());
                SortOrder::Desc
            }
        },
    };

    if !errors.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(errors)));
    }

    Ok(ContentFilter {
        category,
        user_id: query.user_id,
        search: query.search.clone(),
        sort_by,
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ListContentQuery {
        ListContentQuery {
            page: None,
            per_page: None,
            category: None,
            user_id: None,
            search: None,
            sort_by: None,
            order: None,
        }
    }

    #[test]
    fn defaults_are_newest_first() {
        let filter = parse_filter(&query()).unwrap();
        assert_eq!(filter.sort_by, ContentSort::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
        assert!(filter.category.is_none());
    }

    #[test]
    fn bad_category_sort_and_order_are_collected() {
        let mut q = query();
        q.category = Some("podcast".to_string());
        q.sort_by = Some("password_hash".to_string());
        q.order = Some("sideways".to_string());
        let body = parse_filter(&q).unwrap_err().to_json();
        assert!(body["messages"].get("category").is_some());
        assert!(body["messages"].get("sort_by").is_some());
        assert!(body["messages"].get("order").is_some());
    }
}
