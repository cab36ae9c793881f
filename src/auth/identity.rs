use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use super::{Claims, Role};
use crate::error::ApiError;

/// Authenticated principal attached to the request by the gate.
///
/// Lives in the request extensions, which clients cannot write to, so a handler that
/// extracts an `Identity` knows the gate verified it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject_id: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: Missing token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let identity = Identity {
            subject_id: "42".to_string(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["subjectId"], "42");
        assert_eq!(json["role"], "ADMIN");
        assert!(json.get("subject_id").is_none());
    }
}
