use crate::error::ApiError;

/// Any path the router does not know
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// A known path called with a method it does not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}
