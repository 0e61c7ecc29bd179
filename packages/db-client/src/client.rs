//! Client lifecycle: compile driver options, connect, and run the configured
//! migration steps. The returned connection is owned by the caller, who is
//! responsible for closing it.

use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use db_migrate::{MigrateConfig, MigratorTrait, NoMigrations};

use crate::config::DriverConfig;
use crate::errors::DbError;

/// Main configuration object for a database client.
pub struct ClientConfig<D: DriverConfig, M: MigratorTrait = NoMigrations> {
    /// Driver used to communicate with the instance.
    pub driver: D,
    /// Optional migrations to run automatically on connect.
    pub migrations: Option<MigrateConfig<M>>,
    /// Reset the whole database content when opening a new connection.
    /// Only available under test environments (`ENV=test`).
    pub reset_on_conn: bool,
}

impl<D: DriverConfig> ClientConfig<D, NoMigrations> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            migrations: None,
            reset_on_conn: false,
        }
    }
}

impl<D: DriverConfig, M: MigratorTrait> ClientConfig<D, M> {
    pub fn with_migrations<N: MigratorTrait>(
        self,
        migrations: MigrateConfig<N>,
    ) -> ClientConfig<D, N> {
        ClientConfig {
            driver: self.driver,
            migrations: Some(migrations),
            reset_on_conn: self.reset_on_conn,
        }
    }

    pub fn reset_on_conn(mut self, reset: bool) -> Self {
        self.reset_on_conn = reset;
        self
    }

    /// Connect, optionally reset, then apply pending migrations.
    ///
    /// The reset guard runs before anything destructive: without `ENV=test`
    /// the connection is closed and the reset sentinel returned.
    pub async fn connect(&mut self) -> Result<DatabaseConnection, DbError> {
        let options = self.driver.connect_options()?;
        let db = Database::connect(options).await.map_err(DbError::Connect)?;

        if self.reset_on_conn {
            if std::env::var("ENV").as_deref() != Ok("test") {
                let _ = db.close().await;
                return Err(DbError::ResetOutsideTests);
            }
            if let Some(migrations) = &mut self.migrations {
                info!("connect=reset");
                if let Err(e) = migrations.rollback_all(&db).await {
                    let _ = db.close().await;
                    return Err(e.into());
                }
            }
        }

        // Guard check: the migrator rejects an empty migration list.
        if let Some(migrations) = &mut self.migrations {
            if MigrateConfig::<M>::has_migrations() {
                if let Err(e) = migrations.execute(&db).await {
                    let _ = db.close().await;
                    return Err(e.into());
                }
            }
        }

        Ok(db)
    }
}

/// Connect with only a driver, skipping migrations and reset handling.
pub async fn connect_with_driver<D: DriverConfig>(
    driver: &D,
) -> Result<DatabaseConnection, DbError> {
    let options = driver.connect_options()?;
    Database::connect(options).await.map_err(DbError::Connect)
}
