pub mod aggregation;
pub mod authorization;
pub mod content_service;
pub mod rating_service;
pub mod user_service;

pub use content_service::ContentService;
pub use rating_service::RatingService;
pub use user_service::UserService;

use std::collections::HashMap;
use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Service-layer error taxonomy. Each variant maps to exactly one HTTP
/// status in `ApiError`; raw sqlx errors stay in the `Database` variant and
/// never reach clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Pool(#[from] DatabaseError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Validation failure attributed to a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.into());
        ServiceError::Validation {
            message: "Validation failed".to_string(),
            field_errors: Some(field_errors),
        }
    }
}

/// True when the error is a Postgres unique-constraint violation (code 23505).
///
/// Duplicate inserts are detected here, at the store's serialization point,
/// rather than by a pre-check that two concurrent requests could both pass.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// True when the error is a Postgres foreign-key violation (code 23503),
/// e.g. an insert referencing a row a concurrent transaction just deleted.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}
