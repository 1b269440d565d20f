use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Tag successful GET responses with a content hash and answer
/// `If-None-Match` revalidation with 304.
pub async fn http_cache_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.method() != Method::GET {
        return Ok(next.run(request).await);
    }

    let if_none_match = request.headers().get(header::IF_NONE_MATCH).cloned();
    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::error!("Failed to buffer response body: {}", e);
        ApiError::internal_server_error("Failed to render response")
    })?;

    let etag = entity_tag(&bytes);
    let etag_value = HeaderValue::from_str(&etag)
        .map_err(|_| ApiError::internal_server_error("Failed to render response"))?;

    if let Some(candidates) = if_none_match {
        if matches_etag(&candidates, &etag) {
            let mut not_modified = StatusCode::NOT_MODIFIED.into_response();
            not_modified.headers_mut().insert(header::ETAG, etag_value);
            not_modified
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("public"));
            return Ok(not_modified);
        }
    }

    parts.headers.insert(header::ETAG, etag_value);
    parts
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("public"));
    Ok(Response::from_parts(parts, Body::from(bytes)))
}

/// Strong ETag over the rendered body
pub fn entity_tag(body: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(body))
}

fn matches_etag(header: &HeaderValue, etag: &str) -> bool {
    let Ok(value) = header.to_str() else {
        return false;
    };
    value
        .split(',')
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}
