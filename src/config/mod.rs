//! Application configuration loaded from environment.

use std::net::SocketAddr;

use crate::auth::{HashScheme, DEFAULT_BCRYPT_COST};

/// Shortest JWT signing secret accepted at startup.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. `None` runs against the in-process store.
    pub database_url: Option<String>,
    /// JWT signing secret (min 32 bytes). Required.
    pub jwt_secret: String,
    /// Bearer token lifetime in days.
    pub token_ttl_days: i64,
    /// Scheme used for newly written password hashes.
    pub hash_scheme: HashScheme,
    /// Allowed CORS origin; permissive when unset.
    pub cors_origin: Option<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigLoadError::MissingJwtSecret)?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigLoadError::WeakJwtSecret(MIN_JWT_SECRET_LEN));
        }

        let token_ttl_days = match lookup("TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigLoadError::InvalidTokenTtl(raw))?,
            None => 7,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or(ConfigLoadError::InvalidBcryptCost(raw))?,
            None => DEFAULT_BCRYPT_COST,
        };

        let hash_scheme = match lookup("PASSWORD_SCHEME").as_deref() {
            None | Some("bcrypt") => HashScheme::Bcrypt { cost: bcrypt_cost },
            Some("argon2") => HashScheme::Argon2,
            Some(other) => return Err(ConfigLoadError::UnknownPasswordScheme(other.to_string())),
        };

        let cors_origin = lookup("CORS_ORIGIN").filter(|s| !s.trim().is_empty());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            jwt_secret,
            token_ttl_days,
            hash_scheme,
            cors_origin,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("JWT_SECRET must be at least {0} bytes")]
    WeakJwtSecret(usize),
    #[error("Invalid TOKEN_TTL_DAYS: {0}")]
    InvalidTokenTtl(String),
    #[error("Invalid BCRYPT_COST (expected 4..=31): {0}")]
    InvalidBcryptCost(String),
    #[error("Unknown PASSWORD_SCHEME: {0}")]
    UnknownPasswordScheme(String),
}
