use std::sync::Arc;

use crate::auth::{password::DEFAULT_COST, CredentialSettings, TokenKeys};
use crate::config::AppConfig;
use crate::database::UserStore;
use crate::error::ConfigError;
use crate::middleware::{CorsPolicy, RequestGate};

/// Shared, read-only application state. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<RequestGate>,
    pub cors: Arc<CorsPolicy>,
    pub keys: Arc<TokenKeys>,
    pub users: Arc<dyn UserStore>,
    pub credentials: CredentialSettings,
    pub secure_cookies: bool,
    pub password_cost: u32,
}

impl AppState {
    pub fn new(config: &AppConfig, users: Arc<dyn UserStore>) -> Result<Self, ConfigError> {
        let policy = config.route_policy()?;
        let keys = Arc::new(config.token_keys()?);
        let credentials = config.security.credentials.clone();

        Ok(Self {
            gate: Arc::new(RequestGate::new(policy, keys.clone(), credentials.clone())),
            cors: Arc::new(CorsPolicy::new(
                config.security.cors_origins.clone(),
                config.security.cors_max_age_secs,
            )),
            keys,
            users,
            credentials,
            secure_cookies: config.security.secure_cookies,
            password_cost: DEFAULT_COST,
        })
    }

    /// Override the bcrypt cost used for new passwords.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }
}
