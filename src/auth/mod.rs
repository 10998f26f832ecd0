use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

pub mod password;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String) -> Self {
        let now = Utc::now();
        let expiry_secs = config::config().security.jwt_expiry_secs;
        let exp = (now + Duration::seconds(expiry_secs as i64)).timestamp();

        Self {
            sub: user_id,
            username,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn generated_token_round_trips() {
        // Development preset supplies a non-empty secret
        std::env::remove_var("APP_ENV");
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice".to_string());
        let token = generate_jwt(claims).expect("token should be generated");

        let secret = &config::config().security.jwt_secret;
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .expect("token should validate");

        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.username, "alice");
        assert!(decoded.claims.exp > decoded.claims.iat);
    }
}
