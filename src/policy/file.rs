// YAML route policy loading.
//
// Example:
//
//   login_path: /login
//   landing_path: /dashboard
//   public: [/login, /api/auth/login, /api/auth/logout, /favicon.ico, /static]
//   pages: [/, /dashboard, /settings]
//   api:
//     - prefix: /api/admin/users
//       roles: [SUPER_ADMIN]
//   unclassified: allow

use std::path::Path;

use super::{PolicySpec, RoutePolicy};
use crate::error::ConfigError;

pub fn parse_policy(yaml: &str, origin: &str) -> Result<RoutePolicy, ConfigError> {
    let spec: PolicySpec = serde_yaml::from_str(yaml).map_err(|source| ConfigError::PolicyParse {
        path: origin.to_string(),
        source,
    })?;
    Ok(RoutePolicy::new(spec)?)
}

pub fn load_policy_file(path: &Path) -> Result<RoutePolicy, ConfigError> {
    let origin = path.display().to_string();
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::PolicyFile {
        path: origin.clone(),
        source,
    })?;
    let policy = parse_policy(&yaml, &origin)?;
    tracing::info!("Loaded route policy from {}", origin);
    Ok(policy)
}
