//! Database transaction utilities
//!
//! Multi-step writes (organization bootstrap, invitation acceptance) run inside a
//! `TransactionGuard` so a failure part-way leaves no partial rows behind.

use socialhub_core::AppError;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Owns an open transaction until it is committed or rolled back.
///
/// ```ignore
/// let mut tx = TransactionGuard::begin(&pool).await?;
/// sqlx::query("INSERT INTO ...").execute(tx.conn()?).await?;
/// tx.commit().await?;
/// ```
pub struct TransactionGuard {
    transaction: Option<Transaction<'static, Postgres>>,
}

impl TransactionGuard {
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        let transaction = pool.begin().await?;
        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Connection to run statements on. Fails once the transaction is finished.
    pub fn conn(&mut self) -> Result<&mut PgConnection, AppError> {
        match self.transaction.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(AppError::Internal(
                "Transaction was already committed or rolled back".to_string(),
            )),
        }
    }

    pub async fn commit(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        // sqlx rolls the transaction back when the inner value drops
        if self.transaction.is_some() {
            tracing::warn!("Transaction dropped without explicit commit or rollback - rolling back");
        }
    }
}

/// True when `err` is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
