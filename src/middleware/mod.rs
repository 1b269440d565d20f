pub mod auth;
pub mod cache;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use cache::{entity_tag, http_cache_middleware};
