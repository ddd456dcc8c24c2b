use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::domain::{self, CategorySummary, Expense, ExpenseEntry, MonthlyTotal};
use super::repository::ExpenseGateway;
use crate::errors::ServiceError;
use crate::retry::RetryPolicy;

/// Expense business service independent of web framework.
///
/// Replaces of the same date are serialized inside the process, so the stored set is
/// always exactly one caller's list (last writer wins).
pub struct ExpenseService<G: ExpenseGateway + ?Sized> {
    gateway: Arc<G>,
    retry: RetryPolicy,
    date_locks: DashMap<NaiveDate, Arc<Mutex<()>>>,
}

impl<G: ExpenseGateway + ?Sized> ExpenseService<G> {
    pub fn new(gateway: Arc<G>, retry: RetryPolicy) -> Self {
        Self { gateway, retry, date_locks: DashMap::new() }
    }

    /// All expenses recorded on `date`; empty when there are none.
    ///
    /// # Examples
    /// ```
    /// use service::expense::{ExpenseService, repository::mock::MockExpenseGateway};
    /// use service::retry::RetryPolicy;
    /// use std::sync::Arc;
    /// let svc = ExpenseService::new(Arc::new(MockExpenseGateway::default()), RetryPolicy::disabled());
    /// let date = chrono::NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
    /// let rows = tokio_test::block_on(svc.get_expenses_for_date(date)).unwrap();
    /// assert!(rows.is_empty());
    /// ```
    #[instrument(skip_all, fields(%date))]
    pub async fn get_expenses_for_date(&self, date: NaiveDate) -> Result<Vec<Expense>, ServiceError> {
        let rows = self.retry.run("list_for_date", || self.gateway.list_for_date(date)).await?;
        debug!(count = rows.len(), "expenses loaded");
        Ok(rows)
    }

    /// Swap the whole set of expenses stored for `date` for `entries`, atomically.
    ///
    /// # Examples
    /// ```
    /// use service::expense::{ExpenseService, repository::mock::MockExpenseGateway};
    /// use service::expense::domain::{Category, ExpenseEntry};
    /// use service::retry::RetryPolicy;
    /// use std::sync::Arc;
    /// let svc = ExpenseService::new(Arc::new(MockExpenseGateway::default()), RetryPolicy::disabled());
    /// let date = chrono::NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
    /// let entries = vec![ExpenseEntry::new(10.0, Category::Shopping, "Test")];
    /// tokio_test::block_on(svc.replace_expenses_for_date(date, entries.clone())).unwrap();
    /// tokio_test::block_on(svc.replace_expenses_for_date(date, entries)).unwrap();
    /// assert_eq!(tokio_test::block_on(svc.get_expenses_for_date(date)).unwrap().len(), 1);
    /// ```
    #[instrument(skip_all, fields(%date, count = entries.len()))]
    pub async fn replace_expenses_for_date(&self, date: NaiveDate, entries: Vec<ExpenseEntry>) -> Result<(), ServiceError> {
        domain::validate_entries(&entries)?;

        let slot = DateSlot::acquire(&self.date_locks, date);
        {
            let _guard = slot.lock.lock().await;
            self.gateway.replace_for_date(date, &entries).await?;
        }
        drop(slot);

        info!(%date, count = entries.len(), "expenses_replaced");
        Ok(())
    }

    /// Per-category totals and shares of the grand total over `[start, end]`.
    ///
    /// An inverted range is not rejected here; it simply matches nothing.
    #[instrument(skip_all, fields(%start, %end))]
    pub async fn summarize_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CategorySummary>, ServiceError> {
        let rows = self.retry.run("summarize", || self.gateway.summarize(start, end)).await?;
        domain::category_breakdown(rows)
    }

    /// Per-month totals over `[start, end]`, ascending by month.
    #[instrument(skip_all, fields(%start, %end))]
    pub async fn summarize_monthly(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<MonthlyTotal>, ServiceError> {
        let rows = self.retry.run("list_in_range", || self.gateway.list_in_range(start, end)).await?;
        Ok(domain::monthly_totals(&rows))
    }
}

/// Handle on one date's write lock. Dropping it, on any path including a
/// cancelled request, removes the map entry once nobody else holds it.
struct DateSlot<'a> {
    locks: &'a DashMap<NaiveDate, Arc<Mutex<()>>>,
    date: NaiveDate,
    lock: Arc<Mutex<()>>,
}

impl<'a> DateSlot<'a> {
    fn acquire(locks: &'a DashMap<NaiveDate, Arc<Mutex<()>>>, date: NaiveDate) -> Self {
        let lock = locks.entry(date).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        Self { locks, date, lock }
    }
}

impl Drop for DateSlot<'_> {
    fn drop(&mut self) {
        // 本句柄仍持有一份引用，计数为 2 表示再无其他等待者
        self.locks.remove_if(&self.date, |_, l| Arc::strong_count(l) <= 2);
    }
}
