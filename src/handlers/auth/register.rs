use axum::{http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::format;
use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::services::user_service::NewUser;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register - Register a new user
///
/// Expected Input:
/// ```json
/// {
///   "username": "string (3-50 chars)",
///   "email": "string (valid email)",
///   "password": "string (min 6 chars)"
/// }
/// ```
///
/// Returns 201 with the created user and a fresh access token; 400 on
/// validation failure, 409 when the username or email is already taken.
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = require_registration_fields(payload)?;

    let service = UserService::new().await?;
    let user = service.register(input).await?;

    let token = generate_jwt(Claims::new(user.user_id, user.username.clone()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": format::user_profile(&user, true),
            "access_token": token,
        })),
    ))
}

fn require_registration_fields(payload: RegisterRequest) -> Result<NewUser, ApiError> {
    let mut missing = HashMap::new();
    for (field, present) in [
        ("username", payload.username.is_some()),
        ("email", payload.email.is_some()),
        ("password", payload.password.is_some()),
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

    Ok(NewUser {
        username: payload.username.unwrap(),
        email: payload.email.unwrap(),
        password: payload.password.unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_reported_per_field() {
        let payload = RegisterRequest {
            username: Some("alice".to_string()),
            email: None,
            password: None,
        };
        let err = require_registration_fields(payload).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["messages"].get("email").is_some());
        assert!(body["messages"].get("password").is_some());
        assert!(body["messages"].get("username").is_none());
    }
}
