//! Preconfigured Postgres client for integration suites.

use sea_orm::DatabaseConnection;

use db_client::{ClientConfig, DbError, PgConfig};
use db_migrate::{MigrateConfig, MigratorTrait};

/// Connect to the Postgres instance at `POSTGRES_URL` with the given
/// migrator, resetting and re-applying all migrations. Requires `ENV=test`;
/// the reset guard rejects anything else.
pub async fn test_postgres<M: MigratorTrait>() -> Result<DatabaseConnection, DbError> {
    let dsn = std::env::var("POSTGRES_URL")
        .map_err(|_| DbError::config("POSTGRES_URL must be set for database tests"))?;

    ClientConfig::new(PgConfig::with_dsn(dsn))
        .with_migrations(MigrateConfig::<M>::new())
        .reset_on_conn(true)
        .connect()
        .await
}
