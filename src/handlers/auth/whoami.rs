use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::api::format;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::UserService;

/// GET /api/auth/me - Current user's profile, including email
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let service = UserService::new().await?;
    let user = service.get_user(auth.user_id).await?;

    Ok(Json(json!({
        "user": format::user_profile(&user, true),
    })))
}
