//! Argon2 hashing for staff passwords and verification codes

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};

use crate::error::{ApiError, ApiResult};

/// Hash a secret with a fresh salt
pub fn hash_secret(secret: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash secret: {}", e)))
}

/// Check a secret against a stored hash
pub fn verify_secret(secret: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Stored hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_secret("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("Secret123", &hash).unwrap());
        assert!(!verify_secret("secret123", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_secret("x", "not-a-hash"),
            Err(ApiError::Internal(_))
        ));
    }
}
