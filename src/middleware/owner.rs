use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;

use super::auth::AuthUser;
use crate::auth::authorize;
use crate::error::ApiError;
use crate::types::OwnerId;

/// Owner scope for a `/api/:user_id/...` request.
///
/// Runs the authorization guard: the verified subject must equal the `user_id`
/// path segment. As a parts extractor it resolves before any body extractor, so
/// a foreign owner is refused before the body is even read.
#[derive(Clone, Debug)]
pub struct OwnerScope(pub OwnerId);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("Not found"))?;

        let path_owner = params
            .get("user_id")
            .ok_or_else(|| ApiError::not_found("Not found"))?;

        let owner = authorize(&auth_user.0, path_owner).map_err(|e| {
            tracing::warn!(
                "Subject '{}' attempted to access tasks of '{}'",
                auth_user.subject(),
                path_owner
            );
            ApiError::from(e)
        })?;

        Ok(OwnerScope(owner))
    }
}
