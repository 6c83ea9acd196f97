use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use super::AuthError;

/// Result of a successful token verification
#[derive(Clone, Debug)]
pub struct VerifiedToken {
    /// The `sub` claim, treated as the authenticated user id
    pub subject: String,
    /// Every claim in the payload, `sub` and `exp` included
    pub claims: Map<String, Value>,
}

/// Validates bearer tokens against the shared secret.
///
/// Only HS256 is accepted. `exp` and `sub` are required; other claims are passed
/// through without further checks.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, leeway_secs: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_exp = true;
        // The auth provider may stamp an audience; it is not part of the contract.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidToken("signature mismatch".to_string()),
                ErrorKind::InvalidAlgorithm => AuthError::InvalidToken("unsupported algorithm".to_string()),
                ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::InvalidToken(format!("missing required claim '{}'", claim))
                }
                _ => AuthError::InvalidToken("malformed token".to_string()),
            }
        })?;

        let subject = match data.claims.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
            _ => return Err(AuthError::InvalidToken("subject claim must be a non-empty string".to_string())),
        };

        Ok(VerifiedToken {
            subject,
            claims: data.claims,
        })
    }
}
