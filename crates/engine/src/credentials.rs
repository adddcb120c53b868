//! Password hashing and bearer-token issuance.
//!
//! Passwords and security answers are stored as bcrypt hashes; plaintext never
//! reaches the database. Tokens are HS256 JWTs carrying the public identity of
//! the user plus issue/expiry instants.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, users};

/// Token lifetime from issuance.
const TOKEN_TTL_DAYS: i64 = 7;

/// Hash a password (or a security answer) with a per-call random salt.
pub fn hash_password(plain: &str) -> ResultEngine<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(Into::into)
}

/// Check a plaintext candidate against a stored bcrypt hash.
pub fn verify_password(plain: &str, hashed: &str) -> ResultEngine<bool> {
    bcrypt::verify(plain, hashed).map_err(Into::into)
}

/// The claim set inside every issued token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a server-held secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `user`, expiring [`TOKEN_TTL_DAYS`] from now.
    pub fn issue(&self, user: &users::Model) -> ResultEngine<String> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &users::Model, now: DateTime<Utc>) -> ResultEngine<String> {
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify signature and expiry; expired tokens get their own error so the
    /// client can distinguish "log in again" from "bad token".
    pub fn validate(&self, token: &str) -> ResultEngine<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => EngineError::ExpiredToken,
                _ => EngineError::InvalidToken,
            })
    }
}

// Never expose the key material through logs.
impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: "7d2cd20c-52f6-4a31-8f85-08f3c2d148b0".to_string(),
            username: "admin".to_string(),
            email: "admin@fms.com".to_string(),
            phone: "0500000000".to_string(),
            name: "Administrator".to_string(),
            password: "hash".to_string(),
            role: "ADMIN".to_string(),
            is_active: true,
            is_approved: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_then_validate_round_trips_claims() {
        let service = TokenService::new("test-secret");
        let user = sample_user();

        let token = service.issue(&user).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.email, "admin@fms.com");
        assert_eq!(claims.role, "ADMIN");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn validate_rejects_wrong_secret() {
        let service = TokenService::new("test-secret");
        let other = TokenService::new("other-secret");

        let token = service.issue(&sample_user()).unwrap();
        assert_eq!(other.validate(&token), Err(EngineError::InvalidToken));
    }

    #[test]
    fn validate_rejects_garbage() {
        let service = TokenService::new("test-secret");
        assert_eq!(
            service.validate("not-a-token"),
            Err(EngineError::InvalidToken)
        );
    }

    #[test]
    fn validate_rejects_expired_token() {
        let service = TokenService::new("test-secret");
        let issued = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1);

        let token = service.issue_at(&sample_user(), issued).unwrap();
        assert_eq!(service.validate(&token), Err(EngineError::ExpiredToken));
    }

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("admin123").unwrap();
        assert_ne!(hashed, "admin123");
        assert!(verify_password("admin123", &hashed).unwrap());
        assert!(!verify_password("admin124", &hashed).unwrap());
    }

    #[test]
    fn debug_redacts_keys() {
        let service = TokenService::new("test-secret");
        let rendered = format!("{service:?}");
        assert!(!rendered.contains("test-secret"));
    }
}
