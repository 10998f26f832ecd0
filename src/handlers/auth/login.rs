use axum::response::Json;
use serde_json::{json, Value};
use serde::Deserialize;
use std::collections::HashMap;

use crate::api::format;
use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - Authenticate and receive an access token
///
/// Invalid username and invalid password are deliberately indistinguishable
/// in the response. A successful login bumps the user's last_login.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let mut missing = HashMap::new();
    if payload.username.is_none() {
        missing.insert(
            "username".to_string(),
            "Missing data for required field".to_string(),
        );
    }
    if payload.password.is_none() {
        missing.insert(
            "password".to_string(),
            "Missing data for required field".to_string(),
        );
    }
    if !missing.is_empty() {
        return Err(ApiError::validation_error("Validation failed", Some(missing)));
    }

    let service = UserService::new().await?;
    let user = service
        .login(&payload.username.unwrap(), &payload.password.unwrap())
        .await?;

    let token = generate_jwt(Claims::new(user.user_id, user.username.clone()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": format::user_profile(&user, true),
        "access_token": token,
    })))
}
