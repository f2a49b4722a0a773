use std::{env, str::FromStr};

use anyhow::{Context, Result, anyhow, bail};
use strum::{AsRefStr, Display, EnumString};

use crate::payroll::engine::OvertimeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    #[strum(serialize = "mysql")]
    MySql,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required for the mysql backend only.
    pub database_url: Option<String>,
    pub session_ttl: u64,
    pub overtime_mode: OvertimeMode,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_level: String,

    /// Seed account for the memory backend.
    pub admin_username: String,
    pub admin_password: Option<String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}"))
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    pub fn from_env_only() -> Result<Self> {
        let store_backend: StoreBackend = parse_var("STORE_BACKEND", "mysql")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=mysql");
        }

        let api_prefix = var_or("API_PREFIX", "/api");
        if !api_prefix.starts_with('/') {
            bail!("API_PREFIX must start with '/', got {api_prefix:?}");
        }

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:3000"),
            store_backend,
            database_url,
            session_ttl: parse_var("SESSION_TTL", "28800") // default 8 hours
                .context("SESSION_TTL is seconds")?,
            overtime_mode: parse_var("OVERTIME_MODE", "attendance")?,

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix,
            log_level: var_or("LOG_LEVEL", "info"),

            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse() {
        assert_eq!("mysql".parse::<StoreBackend>().unwrap(), StoreBackend::MySql);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(StoreBackend::MySql.as_ref(), "mysql");
        assert!("csv".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn parse_var_reports_the_key() {
        let err = parse_var::<u32>("PAYROLL_TEST_UNSET_RATE", "many").unwrap_err();
        assert!(err.to_string().contains("PAYROLL_TEST_UNSET_RATE"));
        assert_eq!(parse_var::<u32>("PAYROLL_TEST_UNSET_RATE", "42").unwrap(), 42);
    }
}
