use anyhow::Context;
use bizdesk_api::{
    create_app,
    database::{open_user_store, seed_bootstrap_admin},
    policy::UnclassifiedAccess,
    AppConfig, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET_KEY, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Refuse to serve anything without a usable signing secret and route policy.
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting bizdesk API in {:?} mode", config.environment);

    let users = open_user_store(&config.database)
        .await
        .context("failed to open user store")?;
    let state = AppState::new(&config, users).context("invalid route policy")?;

    if let Some(admin) = &config.database.bootstrap_admin {
        seed_bootstrap_admin(state.users.as_ref(), admin, state.password_cost).await?;
    }

    if state.gate.policy().unclassified() == UnclassifiedAccess::Allow {
        tracing::warn!(
            "Paths outside the route policy pass through unauthenticated (UNCLASSIFIED_ACCESS=allow)"
        );
    }

    let app = create_app(state);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("bizdesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
