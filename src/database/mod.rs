//! Datastore consumed by the session issuer and the admin user handlers.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;

use crate::auth::{password::hash_password_async, Role};
use crate::config::{BootstrapAdmin, DatabaseConfig};

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use models::{NewUser, User, UserUpdate};
pub use postgres::PgUserStore;

/// Errors from a `UserStore`
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unreadable user row: {0}")]
    CorruptRow(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Fails with `DuplicateEmail` when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// `Ok(None)` when no user has this id. Fails with `DuplicateEmail` when the new
    /// email belongs to another user.
    async fn update(&self, id: i64, changes: UserUpdate) -> Result<Option<User>, StoreError>;

    /// `Ok(false)` when no user has this id.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Postgres when a URL is configured, otherwise an in-memory store.
pub async fn open_user_store(config: &DatabaseConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    match &config.url {
        Some(url) => {
            let store = PgUserStore::connect(url, config.max_connections).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory and lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

/// Create the bootstrap super admin unless a user with that email already exists.
pub async fn seed_bootstrap_admin(
    store: &dyn UserStore,
    admin: &BootstrapAdmin,
    cost: u32,
) -> anyhow::Result<()> {
    if store.find_by_email(&admin.email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password_async(admin.password.expose().to_string(), cost)
        .await
        .context("failed to hash bootstrap admin password")?;
    let user = store
        .insert(NewUser {
            name: "Administrator".to_string(),
            email: admin.email.clone(),
            password_hash,
            role: Role::SuperAdmin,
        })
        .await?;

    tracing::info!("Bootstrap super admin created (id {})", user.id);
    Ok(())
}
