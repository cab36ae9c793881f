//! The request gate: route classification, credential verification and role checks.
//!
//! `RequestGate::evaluate` is the whole decision and does no I/O; `request_gate` is the
//! axum middleware that applies its verdict.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::auth::{extract_credential, CredentialSettings, Identity, TokenKeys};
use crate::error::{ApiError, GateError};
use crate::policy::{RouteClass, RoutePolicy};

/// What the gate decided for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the request to the router, with the verified identity when there is one.
    Forward(Option<Identity>),
    Redirect(String),
    Reject(GateError),
}

#[derive(Debug, Clone)]
pub struct RequestGate {
    policy: RoutePolicy,
    keys: Arc<TokenKeys>,
    credentials: CredentialSettings,
}

impl RequestGate {
    pub fn new(policy: RoutePolicy, keys: Arc<TokenKeys>, credentials: CredentialSettings) -> Self {
        Self {
            policy,
            keys,
            credentials,
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn evaluate(&self, path: &str, headers: &HeaderMap, now: i64) -> Verdict {
        match self.policy.classify(path) {
            RouteClass::Public => {
                // A live session has no business on the login page.
                if self.policy.is_login_page(path) && self.authenticate(headers, now).is_ok() {
                    return Verdict::Redirect(self.policy.landing_path().to_string());
                }
                Verdict::Forward(None)
            }
            RouteClass::ProtectedApi(rule) => match self.authenticate(headers, now) {
                Ok(identity) if rule.allows(identity.role) => Verdict::Forward(Some(identity)),
                Ok(identity) => {
                    tracing::info!(
                        "Role {} denied on {} (rule {})",
                        identity.role,
                        path,
                        rule.prefix
                    );
                    Verdict::Reject(GateError::InsufficientRole {
                        role: identity.role,
                    })
                }
                Err(e) => Verdict::Reject(e),
            },
            RouteClass::ProtectedPage => match self.authenticate(headers, now) {
                Ok(identity) => Verdict::Forward(Some(identity)),
                Err(_) => Verdict::Redirect(self.policy.login_path().to_string()),
            },
            RouteClass::Unclassified => {
                tracing::debug!("No route rule for {}, passing through", path);
                Verdict::Forward(None)
            }
        }
    }

    fn authenticate(&self, headers: &HeaderMap, now: i64) -> Result<Identity, GateError> {
        let token =
            extract_credential(headers, &self.credentials).ok_or(GateError::MissingCredential)?;

        self.keys.verify(token, now).map(Identity::from).map_err(|e| {
            tracing::warn!("JWT verification error: {}", e);
            GateError::InvalidCredential
        })
    }
}

pub async fn request_gate(
    State(gate): State<Arc<RequestGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Only the gate may attach an identity.
    request.extensions_mut().remove::<Identity>();

    let now = Utc::now().timestamp();
    let verdict = gate.evaluate(request.uri().path(), request.headers(), now);
    tracing::debug!("Gate verdict for {} {}: {:?}", request.method(), request.uri().path(), verdict);

    match verdict {
        Verdict::Forward(identity) => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        Verdict::Redirect(location) => redirect(location),
        Verdict::Reject(err) => ApiError::from(err).into_response(),
    }
}

/// 302 to `location`.
pub fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::policy::UnclassifiedAccess;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const NOW: i64 = 1_700_000_000;

    fn keys() -> Arc<TokenKeys> {
        Arc::new(TokenKeys::new(b"gate-test-secret", Duration::hours(1)))
    }

    fn gate() -> RequestGate {
        RequestGate::new(RoutePolicy::default(), keys(), CredentialSettings::default())
    }

    fn cookie(role: Role) -> HeaderMap {
        let token = keys().issue("17", role, NOW).unwrap().token;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={}", token)).unwrap(),
        );
        headers
    }

    fn identity(role: Role) -> Option<Identity> {
        Some(Identity {
            subject_id: "17".to_string(),
            role,
        })
    }

    #[test]
    fn public_routes_ignore_credentials() {
        let gate = gate();
        let mut junk = HeaderMap::new();
        junk.insert(header::COOKIE, HeaderValue::from_static("token=garbage"));

        for headers in [HeaderMap::new(), junk, cookie(Role::Staff)] {
            assert_eq!(
                gate.evaluate("/api/auth/login", &headers, NOW),
                Verdict::Forward(None)
            );
            assert_eq!(
                gate.evaluate("/static/app.js", &headers, NOW),
                Verdict::Forward(None)
            );
        }
    }

    #[test]
    fn login_page_redirects_live_sessions() {
        let gate = gate();
        assert_eq!(
            gate.evaluate("/login", &HeaderMap::new(), NOW),
            Verdict::Forward(None)
        );
        assert_eq!(
            gate.evaluate("/login", &cookie(Role::Staff), NOW),
            Verdict::Redirect("/dashboard".to_string())
        );
        // An expired session gets the login page again.
        assert_eq!(
            gate.evaluate("/login", &cookie(Role::Staff), NOW + 3600),
            Verdict::Forward(None)
        );
    }

    #[test]
    fn api_role_enforcement() {
        let gate = gate();
        assert_eq!(
            gate.evaluate("/api/admin/users", &cookie(Role::Admin), NOW),
            Verdict::Reject(GateError::InsufficientRole { role: Role::Admin })
        );
        assert_eq!(
            gate.evaluate("/api/admin/users", &cookie(Role::SuperAdmin), NOW),
            Verdict::Forward(identity(Role::SuperAdmin))
        );
        assert_eq!(
            gate.evaluate("/api/admin/employees/4", &cookie(Role::Admin), NOW),
            Verdict::Forward(identity(Role::Admin))
        );
        assert_eq!(
            gate.evaluate("/api/admin/employees", &cookie(Role::Staff), NOW),
            Verdict::Reject(GateError::InsufficientRole { role: Role::Staff })
        );
    }

    #[test]
    fn api_missing_and_invalid_credentials() {
        let gate = gate();
        assert_eq!(
            gate.evaluate("/api/admin/users", &HeaderMap::new(), NOW),
            Verdict::Reject(GateError::MissingCredential)
        );
        assert_eq!(
            gate.evaluate("/api/admin/users", &cookie(Role::SuperAdmin), NOW + 3600),
            Verdict::Reject(GateError::InvalidCredential)
        );

        let mut tampered = HeaderMap::new();
        tampered.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer eyJhbGciOiJIUzI1NiJ9.e30.AAAA"),
        );
        assert_eq!(
            gate.evaluate("/api/admin/users", &tampered, NOW),
            Verdict::Reject(GateError::InvalidCredential)
        );
    }

    #[test]
    fn pages_redirect_without_a_session() {
        let gate = gate();
        let login = Verdict::Redirect("/login".to_string());

        assert_eq!(gate.evaluate("/dashboard", &HeaderMap::new(), NOW), login);
        assert_eq!(
            gate.evaluate("/settings", &cookie(Role::Staff), NOW + 7200),
            login
        );
        assert_eq!(
            gate.evaluate("/", &cookie(Role::Staff), NOW),
            Verdict::Forward(identity(Role::Staff))
        );
    }

    #[test]
    fn unclassified_paths_follow_policy_mode() {
        let open = gate();
        assert_eq!(
            open.evaluate("/api/jobs", &HeaderMap::new(), NOW),
            Verdict::Forward(None)
        );

        let closed = RequestGate::new(
            RoutePolicy::default().with_unclassified(UnclassifiedAccess::RequireSession),
            keys(),
            CredentialSettings::default(),
        );
        assert_eq!(
            closed.evaluate("/api/jobs", &HeaderMap::new(), NOW),
            Verdict::Reject(GateError::MissingCredential)
        );
        assert_eq!(
            closed.evaluate("/api/jobs", &cookie(Role::Staff), NOW),
            Verdict::Forward(identity(Role::Staff))
        );
        assert_eq!(
            closed.evaluate("/reports", &HeaderMap::new(), NOW),
            Verdict::Redirect("/login".to_string())
        );
    }

    #[test]
    fn expiry_boundary_at_the_gate() {
        let gate = gate();
        let headers = cookie(Role::SuperAdmin);
        let exp = NOW + 3600;

        assert!(matches!(
            gate.evaluate("/api/admin/users", &headers, exp - 1),
            Verdict::Forward(Some(_))
        ));
        assert_eq!(
            gate.evaluate("/api/admin/users", &headers, exp),
            Verdict::Reject(GateError::InvalidCredential)
        );
        assert_eq!(
            gate.evaluate("/api/admin/users", &headers, exp + 1),
            Verdict::Reject(GateError::InvalidCredential)
        );
    }
}
