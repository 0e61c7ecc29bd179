//! Environment-derived Postgres configuration, split by profile and access
//! level so migrations and application traffic can use different credentials.

use std::env;

use super::pg::PgConfig;
use crate::errors::DbError;

/// Database profile for different environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    Prod,
    /// Test profile - enforces safety rules on the database name.
    Test,
}

/// Access level used for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (limited permissions).
    App,
    /// Owner-level access (full permissions for migrations).
    Owner,
}

/// Build a `PgConfig` from environment variables for the given profile and
/// owner. Host and port default to localhost:5432.
pub fn pg_from_env(profile: DbProfile, owner: DbOwner) -> Result<PgConfig, DbError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = match env::var("POSTGRES_PORT") {
        Ok(raw) => raw.parse::<u16>().map_err(|_| {
            DbError::config(format!("POSTGRES_PORT is not a valid port number: '{raw}'"))
        })?,
        Err(_) => 5432,
    };
    let database = database_name(profile)?;
    let (user, password) = credentials(owner)?;

    Ok(PgConfig {
        host: Some(host),
        port: Some(port),
        database: Some(database),
        user: Some(user),
        password: Some(password),
        ..Default::default()
    })
}

fn database_name(profile: DbProfile) -> Result<String, DbError> {
    match profile {
        DbProfile::Prod => must_var("PROD_DB"),
        DbProfile::Test => {
            let name = must_var("TEST_DB")?;
            if !name.ends_with("_test") {
                return Err(DbError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{name}'"
                )));
            }
            Ok(name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((must_var("OWNER_DB_USER")?, must_var("OWNER_DB_PASSWORD")?)),
    }
}

fn must_var(name: &str) -> Result<String, DbError> {
    env::var(name)
        .map_err(|_| DbError::config(format!("Required environment variable '{name}' is not set")))
}
