use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Runtime settings for the API process, read once at startup.
///
/// Only `DATABASE_URL` and `JWT_SECRET` are mandatory; everything else falls
/// back to a value that works for a local deployment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Listen port (`PORT`, default `3000`).
    pub port: u16,
    /// Origins allowed by CORS (`CORS_ORIGINS`, comma separated).
    pub cors_origins: Vec<String>,
    /// Per-request deadline in seconds (`REQUEST_TIMEOUT_SECS`, default `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for closing the pool after the listener stops
    /// (`SHUTDOWN_TIMEOUT_SECS`, default `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL connection string (`DATABASE_URL`).
    pub database_url: String,
    /// Pool size cap (`DB_MAX_CONNECTIONS`, default `20`).
    pub db_max_connections: u32,
    /// Token signing and lifetimes, see [`JwtConfig::from_env`].
    pub jwt: JwtConfig,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl ServerConfig {
    /// Build the configuration from the process environment.
    ///
    /// # Panics
    ///
    /// Panics when a mandatory variable is missing or a numeric variable does
    /// not parse. Both are deployment errors that must stop startup.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", DEFAULT_PORT),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            database_url: required_env("DATABASE_URL"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", pstats_db::DEFAULT_MAX_CONNECTIONS),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read `key` and parse it, or use `default` when the variable is unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Read a variable that has no sensible default.
pub(crate) fn required_env(key: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => panic!("{key} must be set in the environment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_when_unset() {
        assert_eq!(env_or("PSTATS_TEST_SURELY_UNSET_VAR", 42u16), 42);
    }
}
