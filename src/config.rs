use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;

use crate::utils::employee_id::IdStrategy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// PostgreSQL connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub auth_disabled: bool,
    pub bind_addr: SocketAddr,
    /// Directory for the daily rolling log file; stdout only when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: tracing::Level,
    pub employee_id_strategy: IdStrategy,
    /// Allowed CORS origins; empty means permissive.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            jwt_secret: "dev-secret".to_string(),
            auth_disabled: false,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_dir: None,
            log_level: tracing::Level::INFO,
            employee_id_strategy: IdStrategy::default(),
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl Config {
    /// Load environment variables (and `.env`, when present) over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let defaults = Config::default();

        let auth_disabled = var("AUTH_DISABLED").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if auth_disabled => defaults.jwt_secret,
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            max_connections: parsed("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            jwt_secret,
            auth_disabled,
            bind_addr: parsed("BIND_ADDR", defaults.bind_addr)?,
            log_dir: var("LOG_DIR").map(PathBuf::from),
            log_level: parsed("LOG_LEVEL", defaults.log_level)?,
            employee_id_strategy: parsed("EMPLOYEE_ID_STRATEGY", defaults.employee_id_strategy)?,
            cors_origins: var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 30u64)?),
        })
    }
}
