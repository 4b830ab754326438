use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// When unset the service falls back to the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_limit_enabled: bool,
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", "86400")?, // default 24h

            rate_limit_enabled: parsed("RATE_LIMIT_ENABLED", "true")?,
            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", "60")?,
            rate_register_per_min: parsed("RATE_REGISTER_PER_MIN", "30")?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: tracing::Level::from_str(log_level.trim())
                .map_err(|_| anyhow::anyhow!("LOG_LEVEL has an invalid value: {log_level:?}"))?,
        })
    }

    /// Settings for in-process tests: no database, no rate limiting.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 3600,
            rate_limit_enabled: false,
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}
