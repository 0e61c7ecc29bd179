//! SQLite driver configuration. In-memory databases get a single-connection
//! pool, since every pooled connection would otherwise see its own database.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use sea_orm::ConnectOptions;

use super::{ConnectOption, DriverConfig};
use crate::errors::DbError;

#[derive(Default)]
pub struct SqliteConfig {
    /// Database file. `None` connects to an in-memory database.
    pub path: Option<PathBuf>,
    /// Create the database file when it does not exist.
    pub create_if_missing: bool,
    pub acquire_timeout: Option<Duration>,
    pub max_connections: Option<u32>,
    pub sqlx_logging: bool,
    /// Fallback for options that cannot be expressed by the fields above.
    /// Applied after every derived option.
    pub options: Vec<ConnectOption>,
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            create_if_missing: true,
            ..Default::default()
        }
    }

    fn url(&self) -> Result<String, DbError> {
        let Some(path) = &self.path else {
            return Ok("sqlite::memory:".to_string());
        };
        let Some(path) = path.to_str() else {
            return Err(DbError::config(format!(
                "sqlite path {} is not valid UTF-8",
                path.display()
            )));
        };
        if self.create_if_missing {
            Ok(format!("sqlite://{path}?mode=rwc"))
        } else {
            Ok(format!("sqlite://{path}"))
        }
    }
}

impl DriverConfig for SqliteConfig {
    fn connect_options(&self) -> Result<ConnectOptions, DbError> {
        let mut opts = ConnectOptions::new(self.url()?);

        if self.path.is_none() {
            // Keep the in-memory database alive and visible on one connection.
            opts.min_connections(1).max_connections(1);
        } else if let Some(max) = self.max_connections {
            opts.max_connections(max);
        }
        if let Some(timeout) = self.acquire_timeout {
            opts.acquire_timeout(timeout);
        }
        opts.sqlx_logging(self.sqlx_logging);

        for option in &self.options {
            option(&mut opts);
        }

        Ok(opts)
    }
}

impl fmt::Debug for SqliteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConfig")
            .field("path", &self.path)
            .field("create_if_missing", &self.create_if_missing)
            .field("options", &self.options.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_url_and_single_connection_pool() {
        let config = SqliteConfig::in_memory();
        let opts = config.connect_options().unwrap();
        assert_eq!(opts.get_url(), "sqlite::memory:");
        assert_eq!(opts.get_max_connections(), Some(1));
    }

    #[test]
    fn file_url_creates_missing_databases() {
        let config = SqliteConfig::file("/tmp/app.db");
        assert_eq!(config.url().unwrap(), "sqlite:///tmp/app.db?mode=rwc");
    }

    #[test]
    fn existing_file_url_without_create_flag() {
        let config = SqliteConfig {
            path: Some(PathBuf::from("/tmp/app.db")),
            ..Default::default()
        };
        assert_eq!(config.url().unwrap(), "sqlite:///tmp/app.db");
    }
}
