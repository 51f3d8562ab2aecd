//! Student account service for a career-services platform.
//!
//! Registration, login, password change, logout and self lookup over a
//! pluggable account store, with bcrypt/argon2 password hashing and
//! stateless JWT bearer tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::AccountService;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
};
use handlers::http;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router (health, account routes). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let protected_routes = axum::Router::new()
        .route("/change-password", post(auth::change_password))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).put(auth::update_me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected_routes);

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: a single allowed origin when configured, permissive otherwise.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid CORS_ORIGIN: {}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}
