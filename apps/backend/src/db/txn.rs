use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

use crate::error::AppError;

/// Boxed future borrowed from a transaction for `'c`.
pub type TxnFuture<'c, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'c>>;

/// Execute `f` within a database transaction.
///
/// Commits on `Ok`, rolls back on `Err` and returns the original error.
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, AppError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, R> + Send,
    R: Send,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Run `f` inside a savepoint of `txn`.
///
/// A failure is logged and rolled back to the savepoint, leaving the outer
/// transaction usable; the caller carries on without the result.
pub async fn best_effort<R, F>(txn: &DatabaseTransaction, what: &'static str, f: F) -> Option<R>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, R> + Send,
    R: Send,
{
    let savepoint = match txn.begin().await {
        Ok(sp) => sp,
        Err(e) => {
            warn!(what, error = %e, "best-effort step skipped: savepoint failed");
            return None;
        }
    };

    match f(&savepoint).await {
        Ok(val) => match savepoint.commit().await {
            Ok(()) => Some(val),
            Err(e) => {
                warn!(what, error = %e, "best-effort step failed to release savepoint");
                None
            }
        },
        Err(err) => {
            warn!(what, error = %err, "best-effort step failed; continuing");
            if let Err(e) = savepoint.rollback().await {
                warn!(what, error = %e, "savepoint rollback failed");
            }
            None
        }
    }
}
