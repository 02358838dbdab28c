//! services/api/src/web/token.rs
//!
//! Bearer token issuance and validation using the jsonwebtoken crate.
//! Tokens are HS256-signed and carry the user id and role, so protected
//! routes resolve an identity without a store lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use udaan_core::domain::{Identity, Role};
use uuid::Uuid;

/// JWT claims structure.
///
/// Standard claims (`sub`, `iat`, `exp`) plus the portal's role claim.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Token validation errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signs a token for the identity, expiring `ttl_days` from now.
pub fn issue(identity: &Identity, secret: &str, ttl_days: i64) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = Claims {
        sub: identity.user_id.to_string(),
        role: identity.role.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Validates a token and resolves it back to an [`Identity`].
pub fn verify(token: &str, secret: &str) -> Result<Identity, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))?;
    let role = Role::parse(&data.claims.role)
        .ok_or_else(|| TokenError::Invalid(format!("unknown role '{}'", data.claims.role)))?;

    Ok(Identity { user_id, role })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role: Role::Recruiter,
        }
    }

    #[test]
    fn issued_tokens_verify_back_to_the_identity() {
        let identity = identity();
        let token = issue(&identity, SECRET, 7).unwrap();
        let resolved = verify(&token, SECRET).unwrap();
        assert_eq!(resolved.user_id, identity.user_id);
        assert_eq!(resolved.role, Role::Recruiter);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = issue(&identity(), "other-secret", 7).unwrap();
        let err = verify(&token, SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue(&identity(), SECRET, -1).unwrap();
        let err = verify(&token, SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = verify("not-a-token", SECRET).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }
}
