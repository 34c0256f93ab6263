//! Runtime configuration read from the environment (after `.env`).

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub nats_url: Option<String>,
    pub nats_subject_prefix: String,
    pub cors_origin: Option<String>,
}

impl Config {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    pub const DEFAULT_SUBJECT_PREFIX: &'static str = "storefront.cart";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map. Empty values count as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            port: parse_or(get("PORT"), "PORT", Self::DEFAULT_PORT)?,
            nats_url: get("NATS_URL"),
            nats_subject_prefix: get("NATS_SUBJECT_PREFIX").unwrap_or_else(|| Self::DEFAULT_SUBJECT_PREFIX.to_string()),
            cors_origin: get("CORS_ORIGIN"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/sweets")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.nats_subject_prefix, "storefront.cart");
        assert_eq!(config.nats_url, None);
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(Config::from_vars(vars(&[])), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(Config::from_vars(vars(&[("DATABASE_URL", "  ")])), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = Config::from_vars(vars(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { name: "PORT", value: "eighty".to_string() });
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "8083"),
            ("NATS_URL", "nats://localhost:4222"),
            ("CORS_ORIGIN", "https://sweet-bites.example"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.nats_url.as_deref(), Some("nats://localhost:4222"));
        assert_eq!(config.cors_origin.as_deref(), Some("https://sweet-bites.example"));
    }
}
