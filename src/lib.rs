use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;

use middleware::{cors_middleware, request_gate};

/// Build the full router. Layers run outside-in: trace, CORS, then the request gate.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(page_routes())
        .merge(auth_routes())
        .merge(admin_routes())
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(state.cors.clone(), cors_middleware))
                .layer(from_fn_with_state(state.gate.clone(), request_gate)),
        )
        .with_state(state)
}

fn page_routes() -> Router<AppState> {
    use handlers::pages;

    Router::new()
        .route("/login", get(pages::login_page))
        .route("/", get(pages::home_page))
        .route("/dashboard", get(pages::dashboard_page))
        .route("/settings", get(pages::settings_page))
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::{protected, public};

    Router::new()
        // Session issuer
        .route("/api/auth/login", post(public::auth::login_post))
        .route(
            "/api/auth/logout",
            get(public::auth::logout).post(public::auth::logout),
        )
        // Authenticated session info
        .route("/api/auth/whoami", get(protected::auth::whoami_get))
}

fn admin_routes() -> Router<AppState> {
    use handlers::protected::admin;

    Router::new()
        .route(
            "/api/admin/users",
            get(admin::users_get).post(admin::users_post),
        )
        .route(
            "/api/admin/users/:id",
            get(admin::user_get)
                .put(admin::user_put)
                .delete(admin::user_delete),
        )
}
