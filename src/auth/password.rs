/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
    #[error("Password verification failed: {0}")]
    Verify(String),
}

/// Hash a password with Argon2id and a random per-password salt.
/// Returns a PHC-formatted string safe for database storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored PHC hash.
/// Returns `false` on mismatch; only malformed hashes are errors.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let password = "correct horse battery";
        let hash = hash_password(password).expect("should hash password successfully");
        assert!(verify_password(password, &hash).expect("should verify successfully"));
    }

    #[test]
    fn verify_wrong_password() {
        let hash = hash_password("secret-one").expect("should hash password successfully");
        assert!(!verify_password("secret-two", &hash).expect("verification should succeed"));
    }

    #[test]
    fn different_hashes_for_same_password() {
        let password = "same password";
        let hash1 = hash_password(password).expect("should hash successfully");
        let hash2 = hash_password(password).expect("should hash successfully");
        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-hash").is_err());
    }
}
