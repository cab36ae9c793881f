// handlers/protected/admin/users.rs - /api/admin/users and /api/admin/users/:id
//
// The route policy restricts this prefix to SUPER_ADMIN; the handlers assume the gate
// already enforced that.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{password::hash_password_async, Identity, Role};
use crate::database::{NewUser, User, UserUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

/// Body of `PUT /api/admin/users/:id`. Fields outside this set (a `password`, for
/// instance) are ignored.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("Invalid user ID"))
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse::<Role>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Trimmed value, with blank strings treated as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/admin/users
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.users.list().await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/admin/users
pub async fn users_post(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<User> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_string();
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Missing required fields"));
    }

    let role = match payload.role.as_deref() {
        None => Role::Staff,
        Some(raw) => parse_role(raw)?,
    };

    let password_hash = hash_password_async(payload.password, state.password_cost)
        .await
        .map_err(|e| {
            tracing::error!("Create User Error: {}", e);
            ApiError::internal_server_error("Internal Server Error")
        })?;

    let user = state
        .users
        .insert(NewUser {
            name,
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(
        "User {} ({}) created by {}",
        user.id,
        user.role,
        identity.subject_id
    );
    Ok(ApiResponse::created(user))
}

/// GET /api/admin/users/:id
pub async fn user_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let id = parse_user_id(&id)?;
    match state.users.find_by_id(id).await? {
        Some(user) => Ok(ApiResponse::success(user)),
        None => Err(ApiError::not_found("User not found")),
    }
}

/// PUT /api/admin/users/:id
pub async fn user_put(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let id = parse_user_id(&id)?;
    let changes = UserUpdate {
        name: non_blank(payload.name),
        email: non_blank(payload.email),
        role: non_blank(payload.role)
            .as_deref()
            .map(parse_role)
            .transpose()?,
    };
    if changes.is_empty() {
        return Err(ApiError::bad_request(
            "At least one field (name, email, or role) must be provided for update",
        ));
    }

    let Some(user) = state.users.update(id, changes).await? else {
        return Err(ApiError::not_found("User not found"));
    };

    tracing::info!("User {} updated by {}", user.id, identity.subject_id);
    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/users/:id
pub async fn user_delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_user_id(&id)?;
    if identity.subject_id.parse::<i64>().ok() == Some(id) {
        return Err(ApiError::bad_request("Cannot delete yourself"));
    }

    if !state.users.delete(id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("User {} deleted by {}", id, identity.subject_id);
    Ok(ApiResponse::success(json!({ "message": "User deleted" })))
}
