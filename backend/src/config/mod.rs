//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, the session store location, the token signing secret and
//! lifetime, and the server port.

use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEFAULT_JWT_SECRET: &str = "tokengate-development-secret";
/// Token and session lifetime used when `JWT_EXPIRES_IN_SECONDS` is unset.
pub const DEFAULT_JWT_EXPIRES_IN_SECONDS: u64 = 900;
/// Longest token and session lifetime accepted: ten years.
pub const MAX_JWT_EXPIRES_IN_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;
/// bcrypt cost used when `BCRYPT_COST` is unset.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Which session store backend to connect at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStoreKind {
    Redis,
    Memory,
}

impl FromStr for SessionStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(SessionStoreKind::Redis),
            "memory" => Ok(SessionStoreKind::Memory),
            other => bail!("unknown session store '{}', expected 'redis' or 'memory'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expires_in_seconds: u64,
    pub bcrypt_cost: u32,
    pub session_store: SessionStoreKind,
    pub redis_url: String,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tokengate.db".to_string());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, falling back to the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let jwt_expires_in_seconds = env::var("JWT_EXPIRES_IN_SECONDS")
            .unwrap_or_else(|_| DEFAULT_JWT_EXPIRES_IN_SECONDS.to_string())
            .parse::<u64>()
            .context("JWT_EXPIRES_IN_SECONDS must be a valid number")?;

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| DEFAULT_BCRYPT_COST.to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;

        let session_store = env::var("SESSION_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .parse::<SessionStoreKind>()
            .context("SESSION_STORE is invalid")?;

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let config = Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            jwt_secret,
            jwt_expires_in_seconds,
            bcrypt_cost,
            session_store,
            redis_url,
            server_port,
        };
        config.validate()?;

        Ok(config)
    }

    /// Rejects values that would produce unusable tokens or sessions.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_expires_in_seconds == 0 {
            bail!("JWT_EXPIRES_IN_SECONDS must be greater than zero");
        }
        if self.jwt_expires_in_seconds > MAX_JWT_EXPIRES_IN_SECONDS {
            bail!(
                "JWT_EXPIRES_IN_SECONDS must be at most {} (ten years)",
                MAX_JWT_EXPIRES_IN_SECONDS
            );
        }
        if self.jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: "secret".to_string(),
            jwt_expires_in_seconds: 900,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            session_store: SessionStoreKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            server_port: 3000,
        }
    }

    #[test]
    fn test_session_store_kind_parsing() {
        assert_eq!("redis".parse::<SessionStoreKind>().unwrap(), SessionStoreKind::Redis);
        assert_eq!(" Memory ".parse::<SessionStoreKind>().unwrap(), SessionStoreKind::Memory);
        assert!("memcached".parse::<SessionStoreKind>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.jwt_expires_in_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_ttl() {
        let mut config = sample();

        config.jwt_expires_in_seconds = MAX_JWT_EXPIRES_IN_SECONDS;
        assert!(config.validate().is_ok());

        config.jwt_expires_in_seconds = MAX_JWT_EXPIRES_IN_SECONDS + 1;
        assert!(config.validate().is_err());

        config.jwt_expires_in_seconds = 100_000_000_000_000_000;
        assert!(config.validate().is_err());

        config.jwt_expires_in_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = sample();
        config.jwt_secret = String::new();
        assert!(config.validate().is_err());
    }
}
