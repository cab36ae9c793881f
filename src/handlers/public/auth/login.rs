// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{password::verify_password_async, session_cookie};
use crate::database::User;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/**
 * POST /api/auth/login - Authenticate by email and password
 *
 * Input:  { "email": "string", "password": "string" }
 * Output: { "success": true, "data": { "token", "expiresIn", "user" } }
 *         plus a `Set-Cookie` carrying the same token.
 *
 * Unknown email and wrong password return the same 401.
 */
pub async fn login_post(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Missing email or password"));
    }

    let Some(user) = state.users.find_by_email(email).await? else {
        tracing::info!("Login rejected: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let matches = verify_password_async(payload.password, user.password_hash.clone())
        .await
        .map_err(|e| {
            tracing::error!("Login Error: {}", e);
            ApiError::internal_server_error("Internal Server Error")
        })?;
    if !matches {
        tracing::info!("Login rejected: wrong password for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state
        .keys
        .issue(&user.id.to_string(), user.role, Utc::now().timestamp())
        .map_err(|e| {
            tracing::error!("Login Error: {}", e);
            ApiError::internal_server_error("Internal Server Error")
        })?;

    tracing::info!("User {} signed in as {}", user.id, user.role);

    let cookie = session_cookie(
        &state.credentials,
        &issued.token,
        issued.expires_in,
        state.secure_cookies,
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(LoginResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user,
        }),
    ))
}
