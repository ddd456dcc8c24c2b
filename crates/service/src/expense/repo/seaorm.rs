use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, error};

use models::errors::ModelError;
use models::expense;

use crate::errors::ServiceError;
use crate::expense::domain::{CategoryTotal, Expense, ExpenseEntry};
use crate::expense::repository::ExpenseGateway;

/// Postgres gateway. Every call borrows a pooled connection for its own scope and is
/// bounded by `op_timeout`.
pub struct SeaOrmExpenseGateway {
    db: DatabaseConnection,
    op_timeout: Duration,
}

impl SeaOrmExpenseGateway {
    pub fn new(db: DatabaseConnection, store: &configs::StoreConfig) -> Self {
        Self { db, op_timeout: store.statement_timeout() }
    }

    pub fn with_timeout(db: DatabaseConnection, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ModelError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => {
                error!(op, error = %e, "store query failed");
                Err(ServiceError::from_model(op, e))
            }
            Err(_) => Err(ServiceError::Timeout { op, after: self.op_timeout }),
        }
    }
}

#[async_trait::async_trait]
impl ExpenseGateway for SeaOrmExpenseGateway {
    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Expense>, ServiceError> {
        let rows = self.bounded("list_for_date", expense::find_for_date(&self.db, date)).await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }

    async fn insert(&self, date: NaiveDate, entry: &ExpenseEntry) -> Result<(), ServiceError> {
        self.bounded(
            "insert",
            expense::insert(&self.db, date, entry.amount, entry.category.into(), &entry.notes),
        )
        .await?;
        Ok(())
    }

    async fn delete_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        let removed = self.bounded("delete_for_date", expense::delete_for_date(&self.db, date)).await?;
        debug!(%date, removed, "deleted expenses");
        Ok(())
    }

    async fn summarize(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CategoryTotal>, ServiceError> {
        let rows = self
            .bounded("summarize", expense::summarize_by_category(&self.db, start, end))
            .await?;
        Ok(rows.into_iter().map(CategoryTotal::from).collect())
    }

    async fn replace_for_date(&self, date: NaiveDate, entries: &[ExpenseEntry]) -> Result<(), ServiceError> {
        let db = &self.db;
        // 事务在出错或超时被丢弃时自动回滚
        let work = async move {
            let txn = db.begin().await?;
            let removed = expense::delete_for_date(&txn, date).await?;
            for entry in entries {
                expense::insert(&txn, date, entry.amount, entry.category.into(), &entry.notes).await?;
            }
            txn.commit().await?;
            debug!(%date, removed, inserted = entries.len(), "replace committed");
            Ok::<(), ModelError>(())
        };
        self.bounded("replace_for_date", work).await
    }

    async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>, ServiceError> {
        let rows = self.bounded("list_in_range", expense::find_in_range(&self.db, start, end)).await?;
        Ok(rows.into_iter().map(Expense::from).collect())
    }
}
