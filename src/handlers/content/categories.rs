use axum::response::Json;
use serde_json::{json, Value};

use crate::database::models::MediaCategory;

/// GET /api/content/categories - The closed category set
pub async fn categories() -> Json<Value> {
    let categories: Vec<&str> = MediaCategory::ALL.iter().map(|c| c.as_str()).collect();

    Json(json!({
        "categories": categories,
    }))
}
