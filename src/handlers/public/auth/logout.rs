use axum::{extract::State, http::header, response::IntoResponse};
use serde_json::json;

use crate::auth::clear_session_cookie;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET|POST /api/auth/logout
///
/// The gate keeps no session state, so logging out only tells the client to drop
/// its cookie. A copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(&state.credentials, state.secure_cookies);
    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "message": "Logged out" })),
    )
}
