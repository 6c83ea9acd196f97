use super::{AuthError, VerifiedToken};
use crate::types::OwnerId;

/// Allow the request only when the verified subject is exactly the owner id in
/// the request path. Comparison is case-sensitive with no overrides.
pub fn authorize(verified: &VerifiedToken, path_owner_id: &str) -> Result<OwnerId, AuthError> {
    if verified.subject == path_owner_id {
        Ok(OwnerId::new(verified.subject.clone()))
    } else {
        Err(AuthError::Forbidden)
    }
}
