//! Bearer token issuance and verification.
//!
//! Tokens are HS256-signed claims `{id, created, expiration}`: the principal
//! id, the issue unix time, and the validity window in seconds. Nothing is
//! stored server-side; validity is a function of signature and elapsed time
//! alone. Any verification failure collapses to "no principal".

use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default validity window: one week.
pub const DEFAULT_EXPIRATION_SECS: i64 = 3600 * 24 * 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal id.
    pub id: i64,
    /// Issue unix time (seconds).
    pub created: i64,
    /// Validity window in seconds from `created`.
    pub expiration: i64,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_expiration: i64,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        TokenSigner {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            default_expiration: DEFAULT_EXPIRATION_SECS,
        }
    }

    pub fn with_expiration(mut self, secs: i64) -> Self {
        self.default_expiration = secs;
        self
    }

    pub fn default_expiration(&self) -> i64 {
        self.default_expiration
    }

    /// Issue a token for a principal id, valid for `expiration` seconds
    /// (the signer default when None).
    pub fn issue(&self, principal_id: i64, expiration: Option<i64>) -> Result<String, AppError> {
        let claims = TokenClaims {
            id: principal_id,
            created: Utc::now().timestamp(),
            expiration: expiration.unwrap_or(self.default_expiration),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::BadRequest(format!("token encoding failed: {}", e)))
    }

    /// Verify signature and freshness. Returns the claims, or None on any
    /// failure (bad signature, malformed token, expired).
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Option<TokenClaims> {
        // expiry lives in our own claims, not in the registered `exp` claim
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        let data = match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("token verification failed: {}", e);
                return None;
            }
        };
        let claims = data.claims;
        // valid strictly before created + expiration; the boundary instant is expired
        if now >= claims.created + claims.expiration {
            tracing::warn!(principal = claims.id, "token expired");
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret")
    }

    #[test]
    fn two_tokens_resolve_to_the_same_principal() {
        let signer = signer();
        let a = signer.issue(7, None).unwrap();
        let b = signer.issue(7, None).unwrap();
        assert_eq!(signer.verify(&a).unwrap().id, 7);
        assert_eq!(signer.verify(&b).unwrap().id, 7);
    }

    #[test]
    fn boundary_instant_is_expired() {
        let signer = signer();
        let token = signer.issue(1, Some(60)).unwrap();
        let created = signer.verify(&token).unwrap().created;
        assert!(signer.verify_at(&token, created + 59).is_some());
        // exactly created + expiration: expired
        assert!(signer.verify_at(&token, created + 60).is_none());
        assert!(signer.verify_at(&token, created + 61).is_none());
    }

    #[test]
    fn tampered_or_foreign_tokens_are_anonymous() {
        let signer = signer();
        let token = signer.issue(1, None).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(signer.verify(&tampered).is_none());
        assert!(signer.verify("not-a-token").is_none());
        let other = TokenSigner::new(b"other-secret");
        assert!(other.verify(&token).is_none());
    }
}
