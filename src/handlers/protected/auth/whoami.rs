// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use crate::auth::Identity;
use crate::middleware::ApiResponse;

/// Echo the identity the gate resolved for this request.
pub async fn whoami_get(identity: Identity) -> ApiResponse<Identity> {
    ApiResponse::success(identity)
}
