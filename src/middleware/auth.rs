use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{AuthError, VerifiedToken};
use crate::error::ApiError;

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser(pub VerifiedToken);

impl AuthUser {
    pub fn subject(&self) -> &str {
        &self.0.subject
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let result = extract_bearer_token(&headers).and_then(|token| state.verifier.verify(token));

    let verified = match result {
        Ok(verified) => verified,
        Err(e) => {
            tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
            return Err(e.into());
        }
    };

    request.extensions_mut().insert(AuthUser(verified));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidScheme)?;

    // Scheme names are case-insensitive
    let (scheme, token) = auth_str.split_once(' ').unwrap_or((auth_str, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    match token.trim() {
        "" => Err(AuthError::InvalidToken("empty token".to_string())),
        token => Ok(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers_with("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers_with("BEARER abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(
            extract_bearer_token(&headers_with("Bearerabc.def.ghi")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer_token(&headers_with("Bearer")),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(matches!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer_token(&headers_with("Bearer   ")),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
