use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::password;
use crate::database::manager::DatabaseManager;
use crate::database::models::User;

use super::{is_unique_violation, ServiceError};

/// Registration input as received on the wire; validated here before the
/// store is touched.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, ServiceError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Register a new account. Username and email uniqueness is pre-checked
    /// for friendly errors, but the unique constraints are what actually
    /// close the race; a violation on insert still maps to Conflict.
    pub async fn register(&self, input: NewUser) -> Result<User, ServiceError> {
        validate_registration(&input)?;

        let username_taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = $1",
        )
        .bind(&input.username)
        .fetch_one(&self.pool)
        .await?;
        if username_taken > 0 {
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }

        let email_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.pool)
                .await?;
        if email_taken > 0 {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = password::hash_password(&input.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(ServiceError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Credential check. Unknown username and wrong password produce the
    /// same error so the response does not reveal which part failed.
    pub async fn login(&self, username: &str, password_input: &str) -> Result<User, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            return Err(ServiceError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        };

        let matches = password::verify_password(password_input, &user.password_hash)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !matches {
            return Err(ServiceError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login = now(), updated_at = now() \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

fn validate_registration(input: &NewUser) -> Result<(), ServiceError> {
    let mut errors = HashMap::new();

    let username_len = input.username.chars().count();
    if !(3..=50).contains(&username_len) {
        errors.insert(
            "username".to_string(),
            "Length must be between 3 and 50".to_string(),
        );
    }

    if input.email.len() > 255 || !is_plausible_email(&input.email) {
        errors.insert(
            "email".to_string(),
            "Not a valid email address".to_string(),
        );
    }

    if input.password.chars().count() < 6 {
        errors.insert(
            "password".to_string(),
            "Length must be at least 6".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(errors),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(username: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validate_registration(&input("alice", "alice@example.com", "secret1")).is_ok());
    }

    #[test]
    fn rejects_short_username_and_password() {
        let err = validate_registration(&input("al", "alice@example.com", "abc")).unwrap_err();
        match err {
            ServiceError::Validation {
                field_errors: Some(fields),
                ..
            } => {
                assert!(fields.contains_key("username"));
                assert!(fields.contains_key("password"));
                assert!(!fields.contains_key("email"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["", "no-at-sign", "@example.com", "user@nodot", "user@.com"] {
            assert!(
                validate_registration(&input("alice", email, "secret1")).is_err(),
                "email {:?} should be rejected",
                email
            );
        }
    }
}
