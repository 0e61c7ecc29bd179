//! Migration sources: SQL scripts (embedded or discovered on disk) and
//! code-based migrations, both exposed as `MigrationTrait` objects so a
//! `MigratorTrait::migrations()` body can mix them freely.

use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use sea_orm::DbErr;
use sea_orm_migration::prelude::*;

use crate::error::MigrateError;

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// A migration backed by raw SQL scripts. The down script is optional;
/// rolling back a migration without one fails with a named error.
#[derive(Debug)]
pub struct SqlMigration {
    name: String,
    up_sql: String,
    down_sql: Option<String>,
}

impl SqlMigration {
    pub fn new(
        name: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            up_sql: up_sql.into(),
            down_sql: Some(down_sql.into()),
        }
    }

    pub fn irreversible(name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up_sql: up_sql.into(),
            down_sql: None,
        }
    }
}

impl MigrationName for SqlMigration {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl MigrationTrait for SqlMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(&self.up_sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match &self.down_sql {
            Some(sql) => {
                manager.get_connection().execute_unprepared(sql).await?;
                Ok(())
            }
            None => Err(DbErr::Migration(format!(
                "migration '{}' has no down script and cannot be rolled back",
                self.name
            ))),
        }
    }
}

/// Discover `<version>_<label>.up.sql` / `.down.sql` pairs in a directory,
/// ordered by numeric version (so `2_x` runs before `10_x`, padded or not).
/// A missing down file yields an irreversible migration; a down file without
/// its up counterpart is an error, as is any other `.sql` file that does not
/// follow the naming scheme.
pub fn sql_dir(path: impl AsRef<Path>) -> Result<Vec<SqlMigration>, MigrateError> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|source| MigrateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut ups: BTreeMap<String, (u64, String)> = BTreeMap::new();
    let mut downs: BTreeMap<String, String> = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|source| MigrateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            return Err(MigrateError::discovery(
                entry.path(),
                "file name is not valid UTF-8",
            ));
        };
        if !file_name.ends_with(".sql") {
            continue;
        }

        let read = |p: std::path::PathBuf| -> Result<String, MigrateError> {
            fs::read_to_string(&p).map_err(|source| MigrateError::Io { path: p, source })
        };

        if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
            let version = check_stem(stem, &entry.path())?;
            ups.insert(stem.to_string(), (version, read(entry.path())?));
        } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
            check_stem(stem, &entry.path())?;
            downs.insert(stem.to_string(), read(entry.path())?);
        } else {
            return Err(MigrateError::discovery(
                entry.path(),
                "sql files must be named '<version>_<label>.up.sql' or '<version>_<label>.down.sql'",
            ));
        }
    }

    if let Some(stem) = downs.keys().find(|stem| !ups.contains_key(*stem)) {
        return Err(MigrateError::discovery(
            path,
            format!("down script '{stem}{DOWN_SUFFIX}' has no matching up script"),
        ));
    }

    let mut migrations: Vec<(u64, SqlMigration)> = ups
        .into_iter()
        .map(|(stem, (version, up_sql))| {
            let migration = match downs.remove(&stem) {
                Some(down_sql) => SqlMigration::new(stem, up_sql, down_sql),
                None => SqlMigration::irreversible(stem, up_sql),
            };
            (version, migration)
        })
        .collect();
    migrations.sort_by(|a, b| (a.0, a.1.name()).cmp(&(b.0, b.1.name())));

    Ok(migrations.into_iter().map(|(_, m)| m).collect())
}

/// Validate the stem and return its numeric version. The version prefix
/// drives ordering, so it is required and must fit in a u64.
fn check_stem(stem: &str, path: &Path) -> Result<u64, MigrateError> {
    let version = stem.split('_').next().unwrap_or_default();
    let version = version.strip_prefix('m').unwrap_or(version);
    if stem.is_empty() || version.is_empty() {
        return Err(MigrateError::discovery(
            path,
            format!("'{stem}' must start with a numeric version, like '0001_create_users'"),
        ));
    }
    version.parse::<u64>().map_err(|_| {
        MigrateError::discovery(
            path,
            format!("'{stem}' must start with a numeric version, like '0001_create_users'"),
        )
    })
}

pub type MigrationFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DbErr>> + Send + 'a>>;

type MigrationFn =
    Box<dyn for<'a> Fn(&'a SchemaManager<'a>) -> MigrationFuture<'a> + Send + Sync>;

/// A migration expressed as code rather than SQL scripts.
pub struct CodeMigration {
    name: String,
    up: MigrationFn,
    down: Option<MigrationFn>,
}

impl CodeMigration {
    pub fn new<U, D>(name: impl Into<String>, up: U, down: D) -> Self
    where
        U: for<'a> Fn(&'a SchemaManager<'a>) -> MigrationFuture<'a> + Send + Sync + 'static,
        D: for<'a> Fn(&'a SchemaManager<'a>) -> MigrationFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            up: Box::new(up),
            down: Some(Box::new(down)),
        }
    }

    pub fn irreversible<U>(name: impl Into<String>, up: U) -> Self
    where
        U: for<'a> Fn(&'a SchemaManager<'a>) -> MigrationFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            up: Box::new(up),
            down: None,
        }
    }
}

impl MigrationName for CodeMigration {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl MigrationTrait for CodeMigration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        (self.up)(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        match &self.down {
            Some(down) => down(manager).await,
            None => Err(DbErr::Migration(format!(
                "migration '{}' has no down function and cannot be rolled back",
                self.name
            ))),
        }
    }
}

/// Ordered collection of migration sources. Registration order is execution
/// order, so SQL and code migrations can be interleaved.
#[derive(Default)]
pub struct MigrationSet {
    migrations: Vec<Box<dyn MigrationTrait>>,
}

impl MigrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sql(mut self, migration: SqlMigration) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    /// Append every migration discovered in `path`, in version order.
    pub fn register_sql_dir(mut self, path: impl AsRef<Path>) -> Result<Self, MigrateError> {
        for migration in sql_dir(path)? {
            self.migrations.push(Box::new(migration));
        }
        Ok(self)
    }

    pub fn register_code(mut self, migration: CodeMigration) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Consume the set for use in a `MigratorTrait::migrations()` body.
    pub fn into_migrations(self) -> Vec<Box<dyn MigrationTrait>> {
        self.migrations
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn sql_dir_pairs_up_and_down_in_version_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0002_add_index.up.sql"), "CREATE INDEX i ON t (c);").unwrap();
        fs::write(dir.path().join("0002_add_index.down.sql"), "DROP INDEX i;").unwrap();
        fs::write(dir.path().join("0001_create_t.up.sql"), "CREATE TABLE t (c int);").unwrap();
        fs::write(dir.path().join("0001_create_t.down.sql"), "DROP TABLE t;").unwrap();

        let migrations = sql_dir(dir.path()).unwrap();
        let names: Vec<&str> = migrations.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["0001_create_t", "0002_add_index"]);
        assert!(migrations.iter().all(|m| m.down_sql.is_some()));
    }

    #[test]
    fn sql_dir_missing_down_is_irreversible() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001_seed.up.sql"), "INSERT INTO t VALUES (1);").unwrap();

        let migrations = sql_dir(dir.path()).unwrap();
        assert_eq!(migrations.len(), 1);
        assert!(migrations[0].down_sql.is_none());
    }

    #[test]
    fn sql_dir_rejects_orphan_down() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001_seed.down.sql"), "DELETE FROM t;").unwrap();

        let err = sql_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::Discovery { .. }));
    }

    #[test]
    fn sql_dir_rejects_unversioned_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("seed.up.sql"), "INSERT INTO t VALUES (1);").unwrap();

        let err = sql_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::Discovery { .. }));
    }

    #[test]
    fn sql_dir_rejects_misnamed_sql_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0001_seed.sql"), "INSERT INTO t VALUES (1);").unwrap();

        let err = sql_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::Discovery { .. }));
    }

    #[test]
    fn sql_dir_ignores_non_sql_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();

        assert!(sql_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn sql_dir_orders_unpadded_versions_numerically() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("10_tenth.up.sql"), "SELECT 10;").unwrap();
        fs::write(dir.path().join("2_second.up.sql"), "SELECT 2;").unwrap();
        fs::write(dir.path().join("1_first.up.sql"), "SELECT 1;").unwrap();

        let migrations = sql_dir(dir.path()).unwrap();
        let names: Vec<&str> = migrations.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["1_first", "2_second", "10_tenth"]);
    }

    #[test]
    fn sql_dir_rejects_oversized_versions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("99999999999999999999999_late.up.sql"),
            "SELECT 1;",
        )
        .unwrap();

        let err = sql_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MigrateError::Discovery { .. }));
    }

    #[test]
    fn sql_dir_accepts_m_prefixed_versions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m20250823_000001_init.up.sql"), "CREATE TABLE t (c int);")
            .unwrap();

        let migrations = sql_dir(dir.path()).unwrap();
        assert_eq!(migrations[0].name(), "m20250823_000001_init");
    }

    #[test]
    fn migration_set_preserves_registration_order() {
        let set = MigrationSet::new()
            .register_sql(SqlMigration::new("0001_a", "SELECT 1;", "SELECT 1;"))
            .register_code(CodeMigration::new(
                "0002_b",
                |_m: &SchemaManager| Box::pin(async { Ok(()) }),
                |_m: &SchemaManager| Box::pin(async { Ok(()) }),
            ))
            .register_sql(SqlMigration::irreversible("0003_c", "SELECT 1;"));

        assert_eq!(set.len(), 3);
        let names: Vec<String> = set
            .into_migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["0001_a", "0002_b", "0003_c"]);
    }
}
