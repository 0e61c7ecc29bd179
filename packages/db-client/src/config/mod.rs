//! Driver configuration: typed options bags compiled into
//! `sea_orm::ConnectOptions`.

pub mod env;
pub mod pg;
pub mod sqlite;

use sea_orm::ConnectOptions;

use crate::errors::DbError;

pub use env::{pg_from_env, DbOwner, DbProfile};
pub use pg::{PgConfig, SslMode};
pub use sqlite::SqliteConfig;

/// Explicit override applied to the compiled options after every derived
/// option. Later entries win.
pub type ConnectOption = Box<dyn Fn(&mut ConnectOptions) + Send + Sync>;

/// A typed driver configuration that compiles down to the option format the
/// client library expects.
pub trait DriverConfig {
    fn connect_options(&self) -> Result<ConnectOptions, DbError>;
}
