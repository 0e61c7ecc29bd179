//! `DbErr` -> sentinel translation. Only a few driver errors are typed well
//! enough to match on directly; common constraint and timeout failures only
//! surface in the message text, so this handler parses them into stable
//! sentinels that repositories and tests can compare against.

use sea_orm::{ConnAcquireErr, DbErr};
use thiserror::Error;

use db_migrate::MigrateError;

#[derive(Debug, Error)]
pub enum DbError {
    /// A query matched no record.
    #[error("could not find any record matching the request")]
    NotFound,
    /// A statement violated a column constraint.
    #[error("record does not satisfy some of the column constraints")]
    ConstraintViolation,
    /// A statement violated a unique constraint. Also counts as a
    /// constraint violation for `is_constraint_violation`.
    #[error("record does not satisfy some of the column constraints: some unique columns have duplicates")]
    UniqueConstraintViolation,
    #[error("database operation timed out")]
    Timeout(#[source] DbErr),
    #[error(
        "reset_on_conn is only available under test environments, please make sure ENV=test \
         is set before using it (this feature is not safe for production)"
    )]
    ResetOutsideTests,
    #[error("configuration error: {message}")]
    Config { message: String },
    #[error("failed to connect the database client")]
    Connect(#[source] DbErr),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
    /// Unrecognized driver error, returned unchanged.
    #[error(transparent)]
    Other(DbErr),
}

impl DbError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// True for both the generic and the unique-constraint sentinel.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation | Self::UniqueConstraintViolation
        )
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueConstraintViolation)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Translate a `DbErr` into a sentinel `DbError`. Total and deterministic:
/// every known code maps to the same sentinel every time, and anything
/// unrecognized passes through as `DbError::Other`.
pub fn map_db_err(err: DbErr) -> DbError {
    match &err {
        DbErr::RecordNotFound(_) => return DbError::NotFound,
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => return DbError::Timeout(err),
        _ => {}
    }

    let msg = err.to_string();

    // Unique violations first: Postgres 23505 or the SQLite message form.
    if mentions_sqlstate(&msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
    {
        return DbError::UniqueConstraintViolation;
    }

    // Remaining integrity violations (not null, foreign key, check, exclusion).
    if ["23502", "23503", "23514", "23P01"]
        .iter()
        .any(|code| mentions_sqlstate(&msg, code))
        || msg.contains("NOT NULL constraint failed")
        || msg.contains("FOREIGN KEY constraint failed")
        || msg.contains("CHECK constraint failed")
    {
        return DbError::ConstraintViolation;
    }

    if mentions_sqlstate(&msg, "57014")
        || msg.contains("statement timeout")
        || msg.contains("pool timed out")
    {
        return DbError::Timeout(err);
    }

    DbError::Other(err)
}

/// Fail with `NotFound` when a statement affected no rows. For updates and
/// deletes that are expected to hit an existing record.
pub fn ensure_rows_affected(rows_affected: u64) -> Result<(), DbError> {
    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
