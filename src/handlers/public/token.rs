// handlers/public/token.rs - POST /api/tokens handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/tokens - exchange credentials for a JWT
///
/// 400 when a credential is missing, 401 when they do not match.
pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    let (email, password) = match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim(), password)
        }
        _ => return Err(ApiError::bad_request("Both email and password are required")),
    };

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(password, &user.password)? {
        tracing::info!("Rejected token request for {}", email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = generate_jwt(&Claims::new(&user))?;
    tracing::info!("Issued token for {} (id {})", user.email, user.id);

    Ok(Json(TokenResponse { token }))
}
