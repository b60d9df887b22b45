//! Account signup, session login and per-user wallet pages.
//!
//! Users and wallets live in Postgres, sessions in Redis; both have
//! in-memory stand-ins for local runs and tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod views;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use middleware::session::{Session, SessionSettings};

use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Build the router for every page plus `/health`. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(auth::login_page).post(auth::login_submit))
        .route("/signup/", get(auth::signup_page).post(auth::signup))
        .route("/home/", get(handlers::home))
        .route("/onboarding/", get(handlers::onboarding))
        .route("/wallet/", get(handlers::wallet))
        .route("/logout/", get(auth::logout).post(auth::logout))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
