#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use bilemo_api::auth::{generate_jwt, Claims};
use bilemo_api::config;
use bilemo_api::database::{MemoryStore, ProductRepository, UserRepository};
use bilemo_api::models::user::ROLE_CLIENT;
use bilemo_api::models::{NewProduct, NewUser, User};
use bilemo_api::{app, AppState};

/// Placeholder hash for accounts that never log in
pub const UNUSED_HASH: &str = "$argon2id$unused";

/// An in-process app over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app(AppState::memory(store.clone(), config::config()));
        Self { store, router }
    }

    /// Insert `count` products, one minute apart, named "Phone 1".."Phone N"
    pub async fn with_products(self, count: usize) -> Result<Self> {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().context("epoch")?;
        for i in 1..=count {
            let at = epoch + Duration::minutes(i as i64);
            ProductRepository::insert(
                self.store.as_ref(),
                NewProduct {
                    name: format!("Phone {}", i),
                    description: format!("Phone number {}", i),
                    price: 100.0 + i as f64,
                    created_at: at,
                    updated_at: at,
                },
            )
            .await?;
        }
        Ok(self)
    }

    /// A ROLE_CLIENT account owned by nobody
    pub async fn client(&self, email: &str) -> Result<User> {
        self.insert_user(email, None, UNUSED_HASH, vec![ROLE_CLIENT.to_string()]).await
    }

    pub async fn user(&self, email: &str, client_id: Option<i64>, password_hash: &str) -> Result<User> {
        self.insert_user(email, client_id, password_hash, Vec::new()).await
    }

    async fn insert_user(
        &self,
        email: &str,
        client_id: Option<i64>,
        password_hash: &str,
        roles: Vec<String>,
    ) -> Result<User> {
        let user = UserRepository::insert(
            self.store.as_ref(),
            NewUser {
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                roles,
                client_id,
                created_at: Utc::now(),
            },
        )
        .await?;
        Ok(user)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, uri, token, None, HeaderMap::new()).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        extra_headers: HeaderMap,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in extra_headers.iter() {
            builder = builder.header(name, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
        };

        Ok(TestResponse { status, headers, body })
    }
}

/// Signed token for `user`, bypassing the credentials endpoint
pub fn token_for(user: &User) -> Result<String> {
    Ok(generate_jwt(&Claims::new(user))?)
}
