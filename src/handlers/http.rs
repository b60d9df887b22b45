//! Shared HTTP plumbing: application state, redirects, and health.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::middleware::session::SessionSettings;
use crate::repositories::{SessionStore, UserRepository};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_settings: SessionSettings,
}

impl AppState {
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}

/// 302 Found to `location`.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// GET /health: liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "wallet-accounts" })),
    )
}
