//! Shared application state and health check.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::JwtSecret;
use crate::services::AccountService;

/// Shared application state for HTTP handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(accounts: AccountService) -> Self {
        Self { accounts }
    }
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
    pub fn jwt_secret(&self) -> &JwtSecret {
        self.accounts.jwt()
    }
}

/// GET /health: liveness check.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "careerdesk" })),
    )
}
