//! Entry point: load config, wire dependencies, and run the server.

use careerdesk::auth::{JwtSecret, PasswordHasher};
use careerdesk::config::Config;
use careerdesk::db::{self, AccountStore, InMemoryAccountStore, PgAccountStore};
use careerdesk::{cors_layer, create_app, AccountService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn AccountStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgAccountStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let jwt_secret = JwtSecret::new(
        &config.jwt_secret,
        chrono::Duration::days(config.token_ttl_days),
    );
    let hasher = PasswordHasher::new(config.hash_scheme);
    let state = AppState::new(AccountService::new(store, hasher, jwt_secret));

    let app = create_app(state).layer(cors_layer(config.cors_origin.as_deref())?);

    tracing::info!(addr = %config.server_addr, scheme = ?config.hash_scheme, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
