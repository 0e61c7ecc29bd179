//! Fixture runner behavior: seeded data is visible inside the transaction
//! and gone once the helper returns.

use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};

use db_client::{map_db_err, ClientConfig, SqliteConfig};
use db_migrate::{
    MigrateConfig, MigrationSet, MigrationTrait, MigratorTrait, SqlMigration,
};
use db_test_support::{test_logging, unique_email, unique_str, with_fixtures};

mod players {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "players")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

struct SchemaMigrator;

impl MigratorTrait for SchemaMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        MigrationSet::new()
            .register_sql(SqlMigration::new(
                "0001_create_players",
                "CREATE TABLE players (id integer PRIMARY KEY, name text NOT NULL, \
                 email text NOT NULL UNIQUE);",
                "DROP TABLE players;",
            ))
            .into_migrations()
    }
}

async fn connect_with_schema() -> sea_orm::DatabaseConnection {
    test_logging::init();
    let mut config = ClientConfig::new(SqliteConfig::in_memory())
        .with_migrations(MigrateConfig::<SchemaMigrator>::new());
    config.connect().await.expect("connect failed")
}

fn player(id: i32) -> players::ActiveModel {
    players::ActiveModel {
        id: Set(id),
        name: Set(unique_str("player")),
        email: Set(unique_email("player")),
    }
}

#[tokio::test]
async fn fixtures_are_visible_in_the_transaction_only() {
    let db = connect_with_schema().await;

    let seen = with_fixtures(&db, vec![player(1), player(2)], |txn: &DatabaseTransaction| {
        Box::pin(async move {
            let found = players::Entity::find().all(txn).await.map_err(map_db_err)?;
            Ok(found.len())
        })
    })
    .await
    .unwrap();
    assert_eq!(seen, 2);

    // Rolled back: nothing leaked into the database.
    let remaining = players::Entity::find().all(&db).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn fixture_filters_work_inside_the_transaction() {
    let db = connect_with_schema().await;
    let email = unique_email("lookup");

    let fixture = players::ActiveModel {
        id: Set(7),
        name: Set("lookup".to_string()),
        email: Set(email.clone()),
    };

    let found = with_fixtures(&db, vec![fixture], |txn: &DatabaseTransaction| {
        let email = email.clone();
        Box::pin(async move {
            players::Entity::find()
                .filter(players::Column::Email.eq(email))
                .one(txn)
                .await
                .map_err(map_db_err)
        })
    })
    .await
    .unwrap();

    assert_eq!(found.map(|m| m.id), Some(7));
}

#[tokio::test]
async fn conflicting_fixtures_surface_the_unique_sentinel() {
    let db = connect_with_schema().await;
    let email = unique_email("dup");

    let one = players::ActiveModel {
        id: Set(1),
        name: Set("one".to_string()),
        email: Set(email.clone()),
    };
    let two = players::ActiveModel {
        id: Set(2),
        name: Set("two".to_string()),
        email: Set(email),
    };

    let err = with_fixtures(&db, vec![one, two], |_txn: &DatabaseTransaction| {
        Box::pin(async { Ok(()) })
    })
    .await
    .unwrap_err();

    assert!(err.is_unique_violation());
}
