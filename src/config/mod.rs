//! Application configuration loaded from environment.

use std::net::SocketAddr;

/// Two weeks, in seconds.
const DEFAULT_SESSION_TTL_SECONDS: u64 = 1_209_600;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    /// PostgreSQL connection URL. Users and wallets are kept in memory when unset.
    pub database_url: Option<String>,
    /// Redis connection URL. Sessions are kept in memory when unset.
    pub redis_url: Option<String>,
    /// Key used to hash session tokens before they reach the session store.
    pub secret_key: String,
    /// Session lifetime, applied to both the cookie and the stored record.
    pub session_ttl_seconds: u64,
    /// Mark the session cookie `Secure` (set when served over HTTPS).
    pub session_cookie_secure: bool,
    /// Directory served under `/static`.
    pub static_dir: String,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let redis_url = lookup("REDIS_URL").filter(|v| !v.trim().is_empty());
        let secret_key = lookup("SECRET_KEY")
            .unwrap_or_else(|| "wallet_secret_key_change_in_production".to_string());

        let session_ttl_seconds = match lookup("SESSION_TTL_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigLoadError::InvalidSessionTtl)?,
            None => DEFAULT_SESSION_TTL_SECONDS,
        };

        let session_cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            Some(v) => parse_bool(&v).ok_or(ConfigLoadError::InvalidCookieSecure)?,
            None => false,
        };

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_addr,
            database_url,
            redis_url,
            secret_key,
            session_ttl_seconds,
            session_cookie_secure,
            static_dir,
            log_level,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid SESSION_TTL_SECONDS (expected a positive integer)")]
    InvalidSessionTtl,
    #[error("Invalid SESSION_COOKIE_SECURE (expected true or false)")]
    InvalidCookieSecure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigLoadError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server_addr.port(), 3000);
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.session_ttl_seconds, DEFAULT_SESSION_TTL_SECONDS);
        assert!(!config.session_cookie_secure);
        assert_eq!(config.static_dir, "static");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://u:p@localhost/wallet"),
            ("REDIS_URL", "redis://127.0.0.1/"),
            ("SESSION_TTL_SECONDS", "60"),
            ("SESSION_COOKIE_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@localhost/wallet")
        );
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.session_ttl_seconds, 60);
        assert!(config.session_cookie_secure);
    }

    #[test]
    fn blank_urls_count_as_unset() {
        let config = load(&[("DATABASE_URL", "  "), ("REDIS_URL", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("SERVER_ADDR", "nope")]),
            Err(ConfigLoadError::InvalidServerAddr)
        ));
        assert!(matches!(
            load(&[("SESSION_TTL_SECONDS", "0")]),
            Err(ConfigLoadError::InvalidSessionTtl)
        ));
        assert!(matches!(
            load(&[("SESSION_COOKIE_SECURE", "maybe")]),
            Err(ConfigLoadError::InvalidCookieSecure)
        ));
    }
}
