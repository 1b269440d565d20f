// handlers/mod.rs - Handler tiers
//
// Public (no auth): /health, POST /api/tokens
// Protected (JWT auth): /api/products*, /api/users*
pub mod protected;
pub mod public;

use axum::http::{header, HeaderValue};

use crate::error::ApiError;
use crate::pagination::{QueryParams, UrlGenerator};

/// `Location` header value for a single resource
pub(crate) fn location(
    urls: &dyn UrlGenerator,
    route: &str,
    id: i64,
) -> Result<(header::HeaderName, HeaderValue), ApiError> {
    let params: QueryParams = [("id", id.to_string())].into_iter().collect();
    let url = urls.generate(route, &params)?;
    let value = HeaderValue::from_str(&url)
        .map_err(|_| ApiError::internal_server_error("Failed to build resource location"))?;
    Ok((header::LOCATION, value))
}
