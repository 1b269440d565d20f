// handlers/protected/users.rs - users managed by the authenticated client

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;

use crate::auth::hash_password;
use crate::database::UserChanges;
use crate::error::ApiError;
use crate::handlers::location;
use crate::middleware::AuthUser;
use crate::models::user::ROLE_CLIENT;
use crate::models::{Entity, NewUser, User, UserInput, UserView, USER_LIST_ROUTE, USER_SHOW_ROUTE};
use crate::pagination::Page;
use crate::state::AppState;

/// GET /api/users - the client and the users it owns, paginated
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    RawQuery(query): RawQuery,
) -> Result<Json<Page<UserView>>, ApiError> {
    let source = state.users.client_source(auth.id).await;
    let page = state
        .pagination
        .create_collection(source.as_ref(), query.as_deref(), USER_LIST_ROUTE, &User::METADATA)
        .await?;

    Ok(Json(page.map(UserView::from)))
}

/// POST /api/users - create a user owned by the authenticated client.
/// Only ROLE_CLIENT accounts may create users, so owned users never own others.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.has_role(ROLE_CLIENT) {
        tracing::warn!("Account {} without {} tried to create a user", auth.id, ROLE_CLIENT);
        return Err(ApiError::forbidden("Only clients can create users"));
    }
    let input = parse_input(payload, false)?;
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(ApiError::bad_request("Both email and password are required"));
    };

    let new_user = NewUser {
        email: email.trim().to_string(),
        password_hash: hash_password(&password)?,
        roles: Vec::new(),
        client_id: Some(auth.id),
        created_at: Utc::now(),
    };
    let user = state.users.insert(new_user).await?;
    tracing::info!("Client {} created user {}", auth.id, user.id);

    let location = location(state.urls.as_ref(), USER_SHOW_ROUTE, user.id)?;
    Ok((StatusCode::CREATED, [location], Json(UserView::from(user))))
}

/// GET /api/users/:id
pub async fn show_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, ApiError> {
    let user = load_owned(&state, &auth, id).await?;
    Ok(Json(UserView::from(user)))
}

/// PUT /api/users/:id - full replacement, both fields required
pub async fn put_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let input = parse_input(payload, false)?;
    update(&state, &auth, id, input).await
}

/// PATCH /api/users/:id - only the fields present change
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let input = parse_input(payload, true)?;
    update(&state, &auth, id, input).await
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    load_owned(&state, &auth, id).await?;
    state.users.remove(id).await?;
    tracing::info!("Client {} deleted user {}", auth.id, id);
    Ok(StatusCode::NO_CONTENT)
}

async fn update(state: &AppState, auth: &AuthUser, id: i64, input: UserInput) -> Result<Json<UserView>, ApiError> {
    load_owned(state, auth, id).await?;

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        email: input.email.map(|e| e.trim().to_string()),
        password_hash,
    };

    let user = state.users.update(id, changes).await?;
    Ok(Json(UserView::from(user)))
}

/// Fetch a user the authenticated client may act on: 404 when absent, 403 when foreign
async fn load_owned(state: &AppState, auth: &AuthUser, id: i64) -> Result<User, ApiError> {
    let user = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    if !user.is_owned_by(auth.id) {
        tracing::warn!("Client {} denied access to user {}", auth.id, id);
        return Err(ApiError::forbidden("You are not allowed to access this user"));
    }
    Ok(user)
}

fn parse_input(payload: Result<Json<UserInput>, JsonRejection>, partial: bool) -> Result<UserInput, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    input
        .validate(partial)
        .map_err(|errors| ApiError::validation_error("The user is invalid", errors))?;
    Ok(input)
}
