use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("migration discovery failed at {path}: {message}")]
    Discovery { path: PathBuf, message: String },
    #[error("failed to read migration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rollback made no progress with {applied} migration(s) still applied")]
    NoProgress { applied: usize },
    #[error("migration execution failed")]
    Db(#[from] DbErr),
}

impl MigrateError {
    pub fn discovery(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Discovery {
            path: path.into(),
            message: message.into(),
        }
    }
}
