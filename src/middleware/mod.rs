//! Middleware: bearer-token authentication for account routes.

pub mod auth;

pub use auth::{require_auth, AuthUser};
