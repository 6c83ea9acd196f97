pub mod guard;
pub mod verifier;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use guard::authorize;
pub use verifier::{TokenVerifier, VerifiedToken};

/// Failures raised while authenticating or authorizing a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Authorization header must use Bearer token format")]
    InvalidScheme,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Not authorized to access this user's tasks")]
    Forbidden,
}

/// Claims written by the development issuer
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signs HS256 tokens with the shared secret.
///
/// Production tokens come from the external auth provider; this issuer exists so
/// the CLI and the tests can mint tokens the verifier accepts.
pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, lifetime_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours as i64),
        })
    }

    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_with_claims(subject, Map::new())
    }

    pub fn issue_with_claims(&self, subject: &str, extra: Map<String, Value>) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_rejects_empty_secret() {
        assert!(matches!(TokenIssuer::new("", 1), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn issued_token_has_three_segments() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let token = issuer.issue("u1").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
