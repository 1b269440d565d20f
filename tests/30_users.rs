mod common;

use anyhow::Result;
use axum::http::{HeaderMap, Method, StatusCode};
use serde_json::json;

use common::{token_for, TestApp, UNUSED_HASH};

/// Two clients with `owned` users each; returns the token of the first
async fn setup(owned: usize) -> Result<(TestApp, i64, i64, String)> {
    let app = TestApp::new();
    let client = app.client("client@bilemo.fr").await?;
    let other = app.client("other@bilemo.fr").await?;
    for i in 1..=owned {
        app.user(&format!("user{}@client.fr", i), Some(client.id), UNUSED_HASH).await?;
        app.user(&format!("user{}@other.fr", i), Some(other.id), UNUSED_HASH).await?;
    }
    let token = token_for(&client)?;
    Ok((app, client.id, other.id, token))
}

#[tokio::test]
async fn list_is_scoped_to_the_client_and_its_users() -> Result<()> {
    let (app, _, _, token) = setup(20).await?;
    let res = app.get("/api/users?count=50", Some(&token)).await?;

    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["total"], 21);
    assert_eq!(res.body["filterBy"], "email");
    let emails: Vec<&str> = res.body["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|u| u["email"].as_str()).collect())
        .unwrap_or_default();
    assert!(emails.contains(&"client@bilemo.fr"));
    assert!(emails.iter().all(|e| !e.ends_with("@other.fr")));
    assert!(res.body["items"][0].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn list_filters_and_paginates_users() -> Result<()> {
    let (app, _, _, token) = setup(12).await?;
    let res = app
        .get("/api/users?filter=user1&orderBy=email&order=ASC&count=2", Some(&token))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    // user1, user10, user11, user12; '0' sorts before '@'
    assert_eq!(res.body["total"], 4);
    assert_eq!(res.body["items"][0]["email"], "user10@client.fr");
    assert_eq!(res.body["items"][1]["email"], "user11@client.fr");
    assert_eq!(
        res.body["_links"]["next"],
        "/api/users?filter=user1&orderBy=email&order=ASC&count=2&page=2"
    );
    Ok(())
}

#[tokio::test]
async fn create_user_returns_location() -> Result<()> {
    let (app, client_id, _, token) = setup(0).await?;
    let res = app
        .send(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({ "email": "new@client.fr", "password": "secret-pass" })),
            HeaderMap::new(),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED, "body: {}", res.body);
    let id = res.body["id"].as_i64().unwrap_or_default();
    assert_eq!(
        res.headers.get("location").and_then(|v| v.to_str().ok()),
        Some(format!("/api/users/{}", id).as_str())
    );

    let stored = bilemo_api::database::UserRepository::find(app.store.as_ref(), id).await?;
    assert!(stored.map(|u| u.is_owned_by(client_id)).unwrap_or(false));
    Ok(())
}

#[tokio::test]
async fn owned_users_cannot_create_users() -> Result<()> {
    let (app, client_id, _, _) = setup(0).await?;
    let owned = app.user("owned@client.fr", Some(client_id), UNUSED_HASH).await?;
    let res = app
        .send(
            Method::POST,
            "/api/users",
            Some(&token_for(&owned)?),
            Some(json!({ "email": "grandchild@client.fr", "password": "secret-pass" })),
            HeaderMap::new(),
        )
        .await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN, "body: {}", res.body);
    let stored = bilemo_api::database::UserRepository::find_by_email(app.store.as_ref(), "grandchild@client.fr").await?;
    assert!(stored.is_none());
    Ok(())
}

#[tokio::test]
async fn create_user_reports_validation_errors() -> Result<()> {
    let (app, _, _, token) = setup(0).await?;
    let res = app
        .send(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({ "email": "not-an-email", "password": "abc" })),
            HeaderMap::new(),
        )
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["type"], "validation_errors");
    assert_eq!(res.body["title"], "There was validation errors");
    assert_eq!(res.body["errors"]["email"][0], "This value is not a valid email address.");
    assert!(res.body["errors"]["password"].is_array());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_unprocessable() -> Result<()> {
    let (app, _, _, token) = setup(1).await?;
    let res = app
        .send(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({ "email": "user1@other.fr", "password": "secret-pass" })),
            HeaderMap::new(),
        )
        .await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["type"], "unique_entity_error");
    Ok(())
}

#[tokio::test]
async fn foreign_users_are_forbidden() -> Result<()> {
    let (app, _, other_id, token) = setup(1).await?;
    let foreign = bilemo_api::database::UserRepository::find_by_email(app.store.as_ref(), "user1@other.fr")
        .await?
        .map(|u| u.id)
        .unwrap_or_default();

    let res = app.get(&format!("/api/users/{}", foreign), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .send(Method::DELETE, &format!("/api/users/{}", foreign), Some(&token), None, HeaderMap::new())
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // a client is not owned by anyone
    let res = app.get(&format!("/api/users/{}", other_id), Some(&token)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/api/users/9999", Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn owned_user_can_be_patched_and_deleted() -> Result<()> {
    let (app, _, _, token) = setup(1).await?;
    let own = bilemo_api::database::UserRepository::find_by_email(app.store.as_ref(), "user1@client.fr")
        .await?
        .map(|u| u.id)
        .unwrap_or_default();
    let uri = format!("/api/users/{}", own);

    let res = app
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "email": "renamed@client.fr" })),
            HeaderMap::new(),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK, "body: {}", res.body);
    assert_eq!(res.body["email"], "renamed@client.fr");

    let res = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "email": "x@client.fr" })), HeaderMap::new())
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.send(Method::DELETE, &uri, Some(&token), None, HeaderMap::new()).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&uri, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
