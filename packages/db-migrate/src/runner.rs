//! Migration orchestration: sequences apply/rollback calls through the SeaORM
//! migrator and caches a report of the last run. Ordering and idempotence are
//! owned by the migrator itself.

use std::marker::PhantomData;

use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use tracing::{error, info};

use crate::error::MigrateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

/// Outcome of the last execute/rollback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub command: MigrationCommand,
    /// Names applied or rolled back by the run, in the order the migrator
    /// reports them.
    pub changed: Vec<String>,
    /// Number of migrations applied once the run finished.
    pub applied_after: usize,
}

/// A migrator with no migrations registered. Default for client configs that
/// do not run migrations on connect.
pub struct NoMigrations;

impl MigratorTrait for NoMigrations {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        Vec::new()
    }
}

/// Configures migrations for a `DatabaseConnection`, generic over the user's
/// migrator type. Repeated `execute` calls are safe; the migrator skips
/// already-applied migrations.
pub struct MigrateConfig<M: MigratorTrait> {
    report: Option<MigrationReport>,
    _migrator: PhantomData<M>,
}

impl<M: MigratorTrait> Default for MigrateConfig<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MigratorTrait> MigrateConfig<M> {
    pub fn new() -> Self {
        Self {
            report: None,
            _migrator: PhantomData,
        }
    }

    pub fn has_migrations() -> bool {
        !M::migrations().is_empty()
    }

    /// Apply every pending migration.
    pub async fn execute(&mut self, db: &DatabaseConnection) -> Result<(), MigrateError> {
        self.run(db, MigrationCommand::Up).await
    }

    /// Roll back the most recent applied migration.
    pub async fn rollback(&mut self, db: &DatabaseConnection) -> Result<(), MigrateError> {
        self.run(db, MigrationCommand::Down).await
    }

    /// Roll back applied migrations one step at a time until none remain.
    /// A no-op when nothing is applied, so repeated calls terminate.
    pub async fn rollback_all(&mut self, db: &DatabaseConnection) -> Result<(), MigrateError> {
        match Self::rollback_all_steps(db).await {
            Ok(changed) => {
                info!(
                    "migrate=rollback_all status=done rolled_back={}",
                    changed.len()
                );
                self.report = Some(MigrationReport {
                    command: MigrationCommand::Reset,
                    changed,
                    applied_after: 0,
                });
                Ok(())
            }
            Err(e) => {
                self.report = None;
                Err(e)
            }
        }
    }

    async fn rollback_all_steps(db: &DatabaseConnection) -> Result<Vec<String>, MigrateError> {
        let mut changed = Vec::new();

        loop {
            let applied = applied_names::<M>(db).await?;
            if applied.is_empty() {
                break;
            }

            if let Err(e) = M::down(db, Some(1)).await {
                error!("migrate=rollback_all status=failed err={e}");
                return Err(MigrateError::Db(e));
            }

            let after = applied_names::<M>(db).await?;
            if after.len() >= applied.len() {
                // A down step that removes nothing would loop forever.
                return Err(MigrateError::NoProgress {
                    applied: after.len(),
                });
            }
            changed.extend(applied.into_iter().filter(|name| !after.contains(name)));
        }

        Ok(changed)
    }

    /// Print migration status through the migrator. Does not touch the report.
    pub async fn status(&self, db: &DatabaseConnection) -> Result<(), MigrateError> {
        M::status(db).await.map_err(MigrateError::Db)
    }

    /// Run a single migrator command, refreshing the cached report. Any
    /// failure, including a version-table lookup, clears the report.
    pub async fn run(
        &mut self,
        db: &DatabaseConnection,
        command: MigrationCommand,
    ) -> Result<(), MigrateError> {
        match Self::run_command(db, command).await {
            Ok(Some(report)) => {
                self.report = Some(report);
                Ok(())
            }
            // Status does not change state, so the report stands.
            Ok(None) => Ok(()),
            Err(e) => {
                self.report = None;
                Err(e)
            }
        }
    }

    async fn run_command(
        db: &DatabaseConnection,
        command: MigrationCommand,
    ) -> Result<Option<MigrationReport>, MigrateError> {
        let before = applied_names::<M>(db).await?;
        info!(
            "migrate=start command={:?} defined={} applied={}",
            command,
            M::migrations().len(),
            before.len()
        );

        let result = match command {
            MigrationCommand::Up => M::up(db, None).await,
            MigrationCommand::Down => M::down(db, Some(1)).await,
            MigrationCommand::Fresh => M::fresh(db).await,
            MigrationCommand::Reset => M::reset(db).await,
            MigrationCommand::Refresh => M::refresh(db).await,
            MigrationCommand::Status => M::status(db).await,
        };

        if let Err(e) = result {
            error!("migrate=failed command={:?} err={e}", command);
            return Err(MigrateError::Db(e));
        }

        if matches!(command, MigrationCommand::Status) {
            return Ok(None);
        }

        let after = applied_names::<M>(db).await?;
        let changed: Vec<String> = if after.len() >= before.len() {
            after
                .iter()
                .filter(|name| !before.contains(name))
                .cloned()
                .collect()
        } else {
            before
                .into_iter()
                .filter(|name| !after.contains(name))
                .collect()
        };

        info!(
            "migrate=done command={:?} applied={} changed={}",
            command,
            after.len(),
            changed.len()
        );
        Ok(Some(MigrationReport {
            command,
            changed,
            applied_after: after.len(),
        }))
    }

    /// Report of the last run. `None` before the first run and after a
    /// failed one.
    pub fn report(&self) -> Option<&MigrationReport> {
        self.report.as_ref()
    }
}

/// Applied migration names, oldest first. An `Exec` error means the version
/// table has not been created yet, which counts as zero applied.
async fn applied_names<M: MigratorTrait>(
    db: &DatabaseConnection,
) -> Result<Vec<String>, MigrateError> {
    match M::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.iter().map(|m| m.name().to_string()).collect()),
        Err(DbErr::Exec(_)) => Ok(Vec::new()),
        Err(e) => Err(MigrateError::Db(e)),
    }
}
