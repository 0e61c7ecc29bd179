//! Migration sources and orchestration over the SeaORM migrator.
//! Used by the client lifecycle and by integration test suites.

pub mod error;
pub mod runner;
pub mod sources;

pub use error::MigrateError;
pub use runner::{MigrateConfig, MigrationCommand, MigrationReport, NoMigrations};
pub use sources::{sql_dir, CodeMigration, MigrationFuture, MigrationSet, SqlMigration};

pub use sea_orm_migration::{MigrationTrait, MigratorTrait, SchemaManager};
