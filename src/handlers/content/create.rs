use axum::{http::StatusCode, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::format;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::content_service::NewContent;
use crate::services::ContentService;

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
    pub content_url: Option<String>,
}

/// POST /api/content - Publish new media content
///
/// Expected Input:
/// ```json
/// {
///   "title": "string",
///   "description": "string (optional)",
///   "category": "game|video|artwork|music",
///   "thumbnail_url": "string (optional)",
///   "content_url": "string"
/// }
/// ```
///
/// The authenticated caller becomes the immutable owner. Returns 201 with
/// the created item including creator summary and (empty) rating stats.
pub async fn content_create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = require_content_fields(payload)?;

    let service = ContentService::new().await?;
    let detail = service.create_content(auth.user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Content created successfully",
            "content": format::content_detail(&detail),
        })),
    ))
}

fn require_content_fields(payload: CreateContentRequest) -> Result<NewContent, ApiError> {
    let mut missing = HashMap::new();
    for (field, present) in [
        ("title", payload.title.is_some()),
        ("category", payload.category.is_some()),
        ("content_url", payload.content_url.is_some()),
    ] {
        if !present {
            missing.insert(
                field.to_string(),
                "Missing data for required field".to_string(),
            );
        }
    }
    if !missing.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(missing)));
    }

    Ok(NewContent {
        title: payload.title.unwrap(),
        description: payload.description,
        category: payload.category.unwrap(),
        thumbnail_url: payload.thumbnail_url,
        content_url: payload.content_url.unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_required_fields_become_field_errors() {
        let payload = CreateContentRequest {
            title: None,
            description: None,
            category: Some("game".to_string()),
            thumbnail_url: None,
            content_url: None,
        };
        let body = require_content_fields(payload).unwrap_err().to_json();
        assert!(body["messages"].get("title").is_some());
        assert!(body["messages"].get("content_url").is_some());
        assert!(body["messages"].get("category").is_none());
    }
}
