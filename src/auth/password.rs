//! Password hashing. bcrypt with the library default cost; verification is
//! the library's constant-effort comparison.

use crate::error::AppError;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::BadRequest(format!("password hashing failed: {}", e)))
}

/// True iff `plain` matches the stored hash. A malformed stored hash counts
/// as a mismatch rather than an error.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        // low cost keeps the test fast; verification is cost-agnostic
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
