use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{CategoryTotal, Expense, ExpenseEntry};
use crate::errors::ServiceError;

/// Store gateway for expense records.
///
/// Implementations must report connectivity/query failures as `ServiceError::Store`
/// or `ServiceError::Timeout`; an empty `Vec` always means "no rows".
#[async_trait]
pub trait ExpenseGateway: Send + Sync {
    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Expense>, ServiceError>;
    async fn insert(&self, date: NaiveDate, entry: &ExpenseEntry) -> Result<(), ServiceError>;
    async fn delete_for_date(&self, date: NaiveDate) -> Result<(), ServiceError>;
    async fn summarize(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CategoryTotal>, ServiceError>;

    /// Delete + insert as one unit: on error the date keeps its previous records.
    async fn replace_for_date(&self, date: NaiveDate, entries: &[ExpenseEntry]) -> Result<(), ServiceError>;
    async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>, ServiceError>;
}

/// In-memory gateway for tests, demos and doc examples, with fault injection.
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Failure injected into the next gateway call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Fault {
        Unavailable,
        Timeout,
    }

    impl Fault {
        fn into_error(self, op: &'static str) -> ServiceError {
            match self {
                Fault::Unavailable => ServiceError::store(op, "connection refused"),
                Fault::Timeout => ServiceError::Timeout { op, after: Duration::from_millis(1) },
            }
        }
    }

    #[derive(Default)]
    pub struct MockExpenseGateway {
        rows: Mutex<Vec<Expense>>,
        faults: Mutex<VecDeque<Fault>>,
        fail_replace_at: Mutex<Option<usize>>,
        calls: AtomicUsize,
    }

    impl MockExpenseGateway {
        pub fn with_rows(rows: Vec<Expense>) -> Self {
            Self { rows: Mutex::new(rows), ..Self::default() }
        }

        /// Queue a fault; each gateway call consumes at most one.
        pub async fn push_fault(&self, fault: Fault) {
            self.faults.lock().await.push_back(fault);
        }

        /// Make the next replace fail while inserting entry number `idx` (0-based).
        pub async fn fail_replace_at_insert(&self, idx: usize) {
            *self.fail_replace_at.lock().await = Some(idx);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub async fn snapshot(&self) -> Vec<Expense> {
            self.rows.lock().await.clone()
        }

        async fn enter(&self, op: &'static str) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.faults.lock().await.pop_front() {
                Some(f) => Err(f.into_error(op)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ExpenseGateway for MockExpenseGateway {
        async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Expense>, ServiceError> {
            self.enter("list_for_date").await?;
            let rows = self.rows.lock().await;
            Ok(rows.iter().filter(|e| e.date == date).cloned().collect())
        }

        async fn insert(&self, date: NaiveDate, entry: &ExpenseEntry) -> Result<(), ServiceError> {
            self.enter("insert").await?;
            self.rows.lock().await.push(Expense::from_entry(date, entry));
            Ok(())
        }

        async fn delete_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
            self.enter("delete_for_date").await?;
            self.rows.lock().await.retain(|e| e.date != date);
            Ok(())
        }

        async fn summarize(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CategoryTotal>, ServiceError> {
            self.enter("summarize").await?;
            let rows = self.rows.lock().await;
            let mut totals = BTreeMap::new();
            for e in rows.iter().filter(|e| start <= e.date && e.date <= end) {
                *totals.entry(e.category).or_insert(0.0) += e.amount;
            }
            Ok(totals.into_iter().map(|(category, total)| CategoryTotal { category, total }).collect())
        }

        async fn replace_for_date(&self, date: NaiveDate, entries: &[ExpenseEntry]) -> Result<(), ServiceError> {
            self.enter("replace_for_date").await?;
            let fail_at = self.fail_replace_at.lock().await.take();
            let mut rows = self.rows.lock().await;
            // 在副本上操作，失败时原数据不变
            let mut staged: Vec<Expense> = rows.iter().filter(|e| e.date != date).cloned().collect();
            for (idx, entry) in entries.iter().enumerate() {
                if fail_at == Some(idx) {
                    return Err(ServiceError::store("replace_for_date", format!("insert #{idx} failed")));
                }
                staged.push(Expense::from_entry(date, entry));
            }
            *rows = staged;
            Ok(())
        }

        async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>, ServiceError> {
            self.enter("list_in_range").await?;
            let rows = self.rows.lock().await;
            let mut out: Vec<Expense> = rows.iter().filter(|e| start <= e.date && e.date <= end).cloned().collect();
            out.sort_by_key(|e| e.date);
            Ok(out)
        }
    }
}
