//! Connection settings.

use std::env;

use sea_orm::ConnectOptions;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://food_rescue.db?mode=rwc";

/// Where the store lives and how the pool is sized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    /// Log every SQL statement at debug level
    pub sql_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: 5,
            sql_logging: false,
        }
    }
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// A private in-memory SQLite database, mostly for tests.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:")
    }

    /// Reads `DATABASE_URL`, `FOOD_RESCUE_MAX_CONNECTIONS` and
    /// `FOOD_RESCUE_SQL_LOGGING`, falling back to the defaults for unset
    /// variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(raw) = env::var("FOOD_RESCUE_MAX_CONNECTIONS") {
            config.max_connections = raw.trim().parse().map_err(|_| {
                Error::validation(
                    "FOOD_RESCUE_MAX_CONNECTIONS",
                    format!("`{raw}` is not a positive integer"),
                )
            })?;
        }
        if let Ok(raw) = env::var("FOOD_RESCUE_SQL_LOGGING") {
            config.sql_logging = parse_flag("FOOD_RESCUE_SQL_LOGGING", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::validation("database_url", "must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(Error::validation("max_connections", "must be at least 1"));
        }
        Ok(())
    }

    pub fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Every connection to an in-memory SQLite database sees its own empty
    /// database, so such pools are pinned to one long-lived connection.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(self.database_url.clone());
        if self.is_memory() {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(self.max_connections);
        }
        opt.sqlx_logging(self.sql_logging);
        opt
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::validation(name, format!("`{raw}` is not a boolean"))),
    }
}
