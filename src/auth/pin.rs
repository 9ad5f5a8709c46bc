use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{AppError, AppResult};

pub fn hash_pin(pin: &str) -> AppResult<String> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(pin.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash PIN: {e}")))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_pin(pin: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        tracing::warn!("Stored manager PIN hash is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_pin_verifies_only_itself() {
        let hash = hash_pin("482913").unwrap();
        assert!(verify_pin("482913", &hash));
        assert!(!verify_pin("482914", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_pin("1234", "not-a-hash"));
    }
}
