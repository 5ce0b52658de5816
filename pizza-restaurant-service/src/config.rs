use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

pub const DEFAULT_DATABASE_URL: &str = "app.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5555";
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file, or `:memory:`.
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
}

impl Config {
    /// Reads `DB_URI`, `BIND_ADDR` and `DB_POOL_SIZE`, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DB_URI")
            .map(|uri| normalize_database_url(&uri).to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_addr.clone(),
            })?;

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DB_POOL_SIZE",
                    value,
                })?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            bind_addr,
            pool_size,
        })
    }
}

/// Accepts SQLAlchemy-style URIs as well as bare paths. `sqlite:///app.db`
/// is relative, `sqlite:////var/app.db` absolute and a bare `sqlite://`
/// names an in-memory database.
fn normalize_database_url(uri: &str) -> &str {
    let path = uri
        .strip_prefix("sqlite:///")
        .or_else(|| uri.strip_prefix("sqlite://"))
        .or_else(|| uri.strip_prefix("sqlite:"))
        .unwrap_or(uri);
    if path.is_empty() {
        ":memory:"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "app.db");
        assert_eq!(config.bind_addr, "127.0.0.1:5555".parse().unwrap());
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn test_sqlite_uri_prefix_is_stripped() {
        let config = config_from(&[("DB_URI", "sqlite:////var/lib/pizza/app.db")]).unwrap();
        assert_eq!(config.database_url, "/var/lib/pizza/app.db");

        let config = config_from(&[("DB_URI", "sqlite:///app.db")]).unwrap();
        assert_eq!(config.database_url, "app.db");

        let config = config_from(&[("DB_URI", "sqlite:///data/app.db")]).unwrap();
        assert_eq!(config.database_url, "data/app.db");

        let config = config_from(&[("DB_URI", "sqlite:app.db")]).unwrap();
        assert_eq!(config.database_url, "app.db");

        let config = config_from(&[("DB_URI", "sqlite://")]).unwrap();
        assert_eq!(config.database_url, ":memory:");

        let config = config_from(&[("DB_URI", "sqlite:///:memory:")]).unwrap();
        assert_eq!(config.database_url, ":memory:");

        let config = config_from(&[("DB_URI", "local.db")]).unwrap();
        assert_eq!(config.database_url, "local.db");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("BIND_ADDR", "not an address")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config_from(&[("DB_POOL_SIZE", "0")]),
            Err(ConfigError::Invalid { key: "DB_POOL_SIZE", .. })
        ));
    }
}
