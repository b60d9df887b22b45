//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wallet_accounts::config::Config;
use wallet_accounts::db;
use wallet_accounts::repositories::{
    InMemorySessionStore, InMemoryUserRepository, RedisSessionStore, SessionStore, UserRepository,
};
use wallet_accounts::{create_app, AppState, SessionSettings};

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

    let users: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(db::PgUserRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users and wallets are kept in memory");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisSessionStore::new(url)?;
            store.ping().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("REDIS_URL not set; sessions are kept in memory");
            Arc::new(InMemorySessionStore::new())
        }
    };

    let state = AppState {
        users,
        sessions,
        session_settings: SessionSettings {
            secret_key: config.secret_key.clone(),
            ttl_seconds: config.session_ttl_seconds,
            cookie_secure: config.session_cookie_secure,
        },
    };

    let app = create_app(state).nest_service("/static", ServeDir::new(&config.static_dir));

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
