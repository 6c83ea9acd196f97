pub mod auth;
pub mod json;
pub mod owner;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use json::ApiJson;
pub use owner::OwnerScope;
