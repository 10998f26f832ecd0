//! Ownership gate for mutations.
//!
//! Content items and ratings are mutable only by the identity that created
//! them: a plain equality check, no roles or admin override. Callers without
//! a validated token never reach this point; the JWT middleware rejects them
//! with 401 first, so a false result here always means 403.

use uuid::Uuid;

use super::ServiceError;

/// May `actor` mutate a resource owned by `owner`?
pub fn can_mutate(actor: Uuid, owner: Uuid) -> bool {
    actor == owner
}

/// Equality check that converts failure into a Forbidden error with a
/// resource-specific message, e.g. "You can only update your own ratings".
pub fn ensure_owner(actor: Uuid, owner: Uuid, message: &str) -> Result<(), ServiceError> {
    if can_mutate(actor, owner) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(message.to_string()))
    }
}
