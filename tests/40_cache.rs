mod common;

use anyhow::Result;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};

use common::{token_for, TestApp};

#[tokio::test]
async fn list_responses_are_tagged_and_revalidated() -> Result<()> {
    let app = TestApp::new().with_products(6).await?;
    let token = token_for(&app.client("client@bilemo.fr").await?)?;

    let res = app.get("/api/products", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("public")
    );
    let etag = res
        .headers
        .get(header::ETAG)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("missing"));
    assert!(etag.to_str()?.starts_with('"'));

    let mut headers = HeaderMap::new();
    headers.insert(header::IF_NONE_MATCH, etag.clone());
    let res = app
        .send(Method::GET, "/api/products", Some(&token), None, headers)
        .await?;
    assert_eq!(res.status, StatusCode::NOT_MODIFIED);
    assert_eq!(res.headers.get(header::ETAG), Some(&etag));

    // another page renders another body
    let res = app.get("/api/products?page=2", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_ne!(res.headers.get(header::ETAG), Some(&etag));
    Ok(())
}

#[tokio::test]
async fn errors_are_not_cached() -> Result<()> {
    let app = TestApp::new().with_products(1).await?;
    let token = token_for(&app.client("client@bilemo.fr").await?)?;

    let res = app.get("/api/products?page=4", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.headers.get(header::ETAG).is_none());
    Ok(())
}

#[tokio::test]
async fn single_resources_are_not_tagged() -> Result<()> {
    let app = TestApp::new().with_products(1).await?;
    let token = token_for(&app.client("client@bilemo.fr").await?)?;

    let res = app.get("/api/products/1", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.get(header::ETAG).is_none());

    let res = app.get("/api/users", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.get(header::ETAG).is_some());
    Ok(())
}
