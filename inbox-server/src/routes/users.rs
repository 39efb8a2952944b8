use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use inbox_core::{User, UserSummary};
use inbox_engine::NewUserRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct DirectoryResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleBody {
    #[serde(default)]
    pub role: String,
}

pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}

pub async fn directory(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<DirectoryResponse>, ApiError> {
    let users = state.users.directory().await?;
    Ok(Json(DirectoryResponse { users }))
}

pub async fn list_all(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.users.list_all(&admin).await?;
    Ok(Json(UsersResponse { users }))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    body: Result<Json<NewUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    inbox_engine::require_admin(&admin)?;
    let Json(request) = body?;
    let user = state.users.create_user(&admin, request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(user_id): Path<String>,
    body: Result<Json<RoleBody>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    inbox_engine::require_admin(&admin)?;
    let Json(body) = body?;
    let user = state.users.update_role(&admin, &user_id, &body.role).await?;
    Ok(Json(UserResponse { user }))
}
