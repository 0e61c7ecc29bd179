//! Transactional fixture runner: seed data, run assertions, roll back.
//! Fixture rows never leak into the database under test.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, TransactionTrait,
};

use db_client::{map_db_err, DbError};

pub type FixtureFuture<'a, R> = Pin<Box<dyn Future<Output = Result<R, DbError>> + Send + 'a>>;

/// Begin a transaction, insert `fixtures`, and hand the transaction to
/// `call`. The transaction is always rolled back, whatever the outcome.
pub async fn with_fixtures<A, R, F>(
    db: &DatabaseConnection,
    fixtures: Vec<A>,
    call: F,
) -> Result<R, DbError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> FixtureFuture<'a, R>,
{
    let txn = db.begin().await.map_err(map_db_err)?;

    let mut seeded = Ok(());
    for fixture in fixtures {
        if let Err(e) = fixture.insert(&txn).await {
            seeded = Err(map_db_err(e));
            break;
        }
    }

    let out = match seeded {
        Ok(()) => call(&txn).await,
        Err(e) => Err(e),
    };

    // Best-effort rollback; preserve the closure's result.
    let _ = txn.rollback().await;
    out
}
