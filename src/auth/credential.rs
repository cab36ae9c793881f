//! Locating the session credential on an inbound request.
//!
//! The session cookie is the canonical transport. A bearer header is accepted as a
//! secondary source for programmatic callers when `accept_bearer` is on; if both are
//! present the cookie wins.

use axum::http::{header, HeaderMap};

/// Default cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSettings {
    pub cookie_name: String,
    pub accept_bearer: bool,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            accept_bearer: true,
        }
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = value.to_str() else {
            continue;
        };
        for part in cookie_header.split(';') {
            if let Some((key, value)) = part.trim().split_once('=') {
                if key.trim() == name {
                    return Some(value.trim());
                }
            }
        }
    }
    None
}

/// Extract a token from an `Authorization: Bearer` header.
fn get_bearer(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Find the session credential. Empty values count as absent.
pub fn extract_credential<'a>(headers: &'a HeaderMap, settings: &CredentialSettings) -> Option<&'a str> {
    if let Some(token) = get_cookie(headers, &settings.cookie_name).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    if settings.accept_bearer {
        return get_bearer(headers);
    }
    None
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(settings: &CredentialSettings, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        settings.cookie_name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value telling the client to drop its session token.
pub fn clear_session_cookie(settings: &CredentialSettings, secure: bool) -> String {
    session_cookie(settings, "", 0, secure)
}
