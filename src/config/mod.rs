use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

use crate::auth::{CredentialSettings, TokenKeys};
use crate::error::ConfigError;
use crate::policy::{load_policy_file, RoutePolicy, UnclassifiedAccess};

/// Minimum secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Longest session lifetime accepted, in hours (one year).
pub const MAX_SESSION_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Secret,
    pub jwt_expiry_hours: u64,
    pub credentials: CredentialSettings,
    pub secure_cookies: bool,
    pub cors_origins: Vec<String>,
    pub cors_max_age_secs: u64,
    /// Overrides the `unclassified` mode of the loaded policy when set.
    pub unclassified: Option<UnclassifiedAccess>,
    pub policy_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Super admin created at startup when no user with this email exists yet.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: Secret,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &self.password)
            .finish()
    }
}

/// String that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. Fails when the signing secret is
    /// missing, blank, or too short for production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = load_secret(lookup("JWT_SECRET_KEY"), environment)?;

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(secret),
            Environment::Staging => Self::staging(secret),
            Environment::Development => Self::development(secret),
        }
        .with_env_overrides(&lookup)
    }

    fn with_env_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("BIZDESK_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_value("PORT", &v)?;
        }
        if let Some(v) = lookup("BIND_ADDRESS") {
            self.server.bind = v;
        }

        // Security overrides
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours = parse_value("JWT_EXPIRY_HOURS", &v)?;
            session_ttl(hours)?;
            self.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = lookup("SESSION_COOKIE_NAME") {
            if v.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_COOKIE_NAME",
                    value: v,
                });
            }
            self.security.credentials.cookie_name = v.trim().to_string();
        }
        if let Some(v) = lookup("ACCEPT_BEARER") {
            self.security.credentials.accept_bearer = parse_value("ACCEPT_BEARER", &v)?;
        }
        if let Some(v) = lookup("SECURE_COOKIES") {
            self.security.secure_cookies = parse_value("SECURE_COOKIES", &v)?;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if self.security.cors_origins.iter().any(|o| o == "*") {
                return Err(ConfigError::InvalidValue {
                    name: "CORS_ORIGINS",
                    value: v,
                });
            }
        }
        if let Some(v) = lookup("CORS_MAX_AGE_SECS") {
            self.security.cors_max_age_secs = parse_value("CORS_MAX_AGE_SECS", &v)?;
        }
        if let Some(v) = lookup("UNCLASSIFIED_ACCESS") {
            self.security.unclassified = Some(parse_value("UNCLASSIFIED_ACCESS", &v)?);
        }
        if let Some(v) = lookup("ROUTE_POLICY_FILE") {
            self.security.policy_file = Some(PathBuf::from(v));
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let (Some(email), Some(password)) =
            (lookup("BOOTSTRAP_ADMIN_EMAIL"), lookup("BOOTSTRAP_ADMIN_PASSWORD"))
        {
            self.database.bootstrap_admin = Some(BootstrapAdmin {
                email,
                password: Secret::new(password),
            });
        }

        Ok(self)
    }

    fn development(secret: Secret) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: secret,
                jwt_expiry_hours: 24 * 7, // 1 week
                credentials: CredentialSettings::default(),
                secure_cookies: false,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                cors_max_age_secs: 600,
                unclassified: None,
                policy_file: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                bootstrap_admin: None,
            },
        }
    }

    fn staging(secret: Secret) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: secret,
                jwt_expiry_hours: 24,
                credentials: CredentialSettings::default(),
                secure_cookies: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                cors_max_age_secs: 3600,
                unclassified: None,
                policy_file: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                bootstrap_admin: None,
            },
        }
    }

    fn production(secret: Secret) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: secret,
                jwt_expiry_hours: 8,
                credentials: CredentialSettings::default(),
                secure_cookies: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                cors_max_age_secs: 3600,
                unclassified: None,
                policy_file: None,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                bootstrap_admin: None,
            },
        }
    }

    pub fn token_keys(&self) -> Result<TokenKeys, ConfigError> {
        self.token_keys_for(self.security.jwt_expiry_hours)
    }

    /// Signing keys with a lifetime other than the configured one.
    pub fn token_keys_for(&self, hours: u64) -> Result<TokenKeys, ConfigError> {
        Ok(TokenKeys::new(
            self.security.jwt_secret.expose().as_bytes(),
            session_ttl(hours)?,
        ))
    }

    /// Route policy from `ROUTE_POLICY_FILE`, or the built-in table.
    pub fn route_policy(&self) -> Result<RoutePolicy, ConfigError> {
        let policy = match &self.security.policy_file {
            Some(path) => load_policy_file(path)?,
            None => RoutePolicy::default(),
        };
        Ok(match self.security.unclassified {
            Some(mode) => policy.with_unclassified(mode),
            None => policy,
        })
    }
}

fn load_secret(raw: Option<String>, environment: Environment) -> Result<Secret, ConfigError> {
    let raw = raw.ok_or(ConfigError::MissingSecret)?;
    if raw.trim().is_empty() {
        return Err(ConfigError::BlankSecret);
    }
    if environment == Environment::Production && raw.len() < MIN_PRODUCTION_SECRET_BYTES {
        return Err(ConfigError::WeakSecret {
            min: MIN_PRODUCTION_SECRET_BYTES,
            actual: raw.len(),
        });
    }
    Ok(Secret::new(raw))
}

/// Session lifetime for `hours`, which must be in `1..=MAX_SESSION_HOURS`.
pub fn session_ttl(hours: u64) -> Result<Duration, ConfigError> {
    if !(1..=MAX_SESSION_HOURS).contains(&hours) {
        return Err(ConfigError::InvalidValue {
            name: "JWT_EXPIRY_HOURS",
            value: hours.to_string(),
        });
    }
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(|| ConfigError::InvalidValue {
            name: "JWT_EXPIRY_HOURS",
            value: hours.to_string(),
        })
}

fn parse_value<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
