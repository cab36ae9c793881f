//! Route policy: which paths are public, which pages need a session, and which API
//! prefixes need which roles.
//!
//! A `RoutePolicy` is validated once at startup and only read afterwards. Classification
//! always runs in the same order: public prefixes, then API prefixes, then exact page
//! matches, and anything left over is `Unclassified`.

use serde::Deserialize;
use thiserror::Error;

use crate::auth::Role;

pub mod file;

pub use file::{load_policy_file, parse_policy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Route entry '{0}' must start with '/'")]
    NotAbsolute(String),

    #[error("API rule '{0}' allows no roles")]
    EmptyRoles(String),

    #[error("API rule '{prefix}' can never match: public prefix '{by}' wins first")]
    ShadowedApi { prefix: String, by: String },

    #[error("API rule '{prefix}' can never match: earlier API rule '{by}' wins first")]
    ShadowedApiRule { prefix: String, by: String },

    #[error("Protected page '{page}' can never match: prefix '{by}' wins first")]
    ShadowedPage { page: String, by: String },

    #[error("Login page '{0}' must be covered by a public prefix")]
    LoginNotPublic(String),

    #[error("Landing page '{0}' cannot be the login page")]
    LandingIsLogin(String),
}

/// What the gate does with a path no rule mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnclassifiedAccess {
    /// Pass through without any credential check.
    #[default]
    Allow,
    /// Treat `/api/...` as an API route open to every role and anything else as a page.
    RequireSession,
}

impl std::str::FromStr for UnclassifiedAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allow" => Ok(UnclassifiedAccess::Allow),
            "require-session" => Ok(UnclassifiedAccess::RequireSession),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiRule {
    pub prefix: String,
    pub roles: Vec<Role>,
}

impl ApiRule {
    pub fn new(prefix: impl Into<String>, roles: &[Role]) -> Self {
        Self {
            prefix: prefix.into(),
            roles: roles.to_vec(),
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Result of matching a path against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass<'a> {
    Public,
    ProtectedApi(&'a ApiRule),
    ProtectedPage,
    Unclassified,
}

/// Unvalidated policy table, as written in code or in a YAML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    pub login_path: String,
    pub landing_path: String,
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default)]
    pub api: Vec<ApiRule>,
    #[serde(default)]
    pub unclassified: UnclassifiedAccess,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
            public: vec![
                "/login".to_string(),
                "/api/auth/login".to_string(),
                "/api/auth/logout".to_string(),
                "/favicon.ico".to_string(),
                "/static".to_string(),
            ],
            pages: vec!["/".to_string(), "/dashboard".to_string(), "/settings".to_string()],
            api: vec![
                ApiRule::new("/api/admin/users", &[Role::SuperAdmin]),
                ApiRule::new("/api/admin/employees", &[Role::SuperAdmin, Role::Admin]),
                ApiRule::new("/api/auth/whoami", &Role::ALL),
            ],
            unclassified: UnclassifiedAccess::Allow,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoutePolicy {
    spec: PolicySpec,
    any_role: ApiRule,
}

impl RoutePolicy {
    pub fn new(spec: PolicySpec) -> Result<Self, PolicyError> {
        let entries = spec
            .public
            .iter()
            .chain(&spec.pages)
            .chain(spec.api.iter().map(|rule| &rule.prefix))
            .chain([&spec.login_path, &spec.landing_path]);
        for entry in entries {
            if !entry.starts_with('/') {
                return Err(PolicyError::NotAbsolute(entry.clone()));
            }
        }

        for (i, rule) in spec.api.iter().enumerate() {
            if rule.roles.is_empty() {
                return Err(PolicyError::EmptyRoles(rule.prefix.clone()));
            }
            if let Some(by) = spec.public.iter().find(|p| rule.prefix.starts_with(p.as_str())) {
                return Err(PolicyError::ShadowedApi {
                    prefix: rule.prefix.clone(),
                    by: by.clone(),
                });
            }
            // First match wins, so a narrower rule must come before any broader one.
            if let Some(by) = spec.api[..i]
                .iter()
                .find(|earlier| rule.prefix.starts_with(earlier.prefix.as_str()))
            {
                return Err(PolicyError::ShadowedApiRule {
                    prefix: rule.prefix.clone(),
                    by: by.prefix.clone(),
                });
            }
        }

        for page in &spec.pages {
            let shadow = spec
                .public
                .iter()
                .chain(spec.api.iter().map(|rule| &rule.prefix))
                .find(|p| page.starts_with(p.as_str()));
            if let Some(by) = shadow {
                return Err(PolicyError::ShadowedPage {
                    page: page.clone(),
                    by: by.clone(),
                });
            }
        }

        if !spec.public.iter().any(|p| spec.login_path.starts_with(p.as_str())) {
            return Err(PolicyError::LoginNotPublic(spec.login_path.clone()));
        }
        if spec.landing_path == spec.login_path {
            return Err(PolicyError::LandingIsLogin(spec.landing_path.clone()));
        }

        Ok(Self {
            spec,
            any_role: ApiRule::new("/api", &Role::ALL),
        })
    }

    pub fn classify(&self, path: &str) -> RouteClass<'_> {
        if self.spec.public.iter().any(|p| path.starts_with(p.as_str())) {
            return RouteClass::Public;
        }
        if let Some(rule) = self.spec.api.iter().find(|r| path.starts_with(r.prefix.as_str())) {
            return RouteClass::ProtectedApi(rule);
        }
        if self.spec.pages.iter().any(|p| p == path) {
            return RouteClass::ProtectedPage;
        }
        match self.spec.unclassified {
            UnclassifiedAccess::Allow => RouteClass::Unclassified,
            UnclassifiedAccess::RequireSession if is_api_path(path) => {
                RouteClass::ProtectedApi(&self.any_role)
            }
            UnclassifiedAccess::RequireSession => RouteClass::ProtectedPage,
        }
    }

    pub fn is_login_page(&self, path: &str) -> bool {
        path == self.spec.login_path
    }

    pub fn login_path(&self) -> &str {
        &self.spec.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.spec.landing_path
    }

    pub fn unclassified(&self) -> UnclassifiedAccess {
        self.spec.unclassified
    }

    pub fn with_unclassified(mut self, mode: UnclassifiedAccess) -> Self {
        self.spec.unclassified = mode;
        self
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            spec: PolicySpec::default(),
            any_role: ApiRule::new("/api", &Role::ALL),
        }
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
