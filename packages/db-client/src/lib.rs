//! Configuration and lifecycle helpers for SeaORM database clients: driver
//! option compilation, migrations on connect, and sentinel error translation.
//!
//! Connection lifetime stays with the caller; nothing here pools or retries.

pub mod client;
pub mod config;
pub mod errors;
pub mod records;

pub use client::{connect_with_driver, ClientConfig};
pub use config::{pg_from_env, DbOwner, DbProfile, DriverConfig, PgConfig, SqliteConfig, SslMode};
pub use errors::{ensure_rows_affected, map_db_err, DbError};
pub use records::Metadata;
