use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub use common::types::{Category, CategorySummary, DateRange, ExpenseEntry, MonthlyTotal};

/// Largest amount a single expense may carry. Keeps every range sum finite.
pub const MAX_AMOUNT: f64 = 1e12;

/// Stored expense (business view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Category,
    pub notes: String,
}

impl Expense {
    pub fn from_entry(date: NaiveDate, entry: &ExpenseEntry) -> Self {
        Self { date, amount: entry.amount, category: entry.category, notes: entry.notes.clone() }
    }

    pub fn entry(&self) -> ExpenseEntry {
        ExpenseEntry { amount: self.amount, category: self.category, notes: self.notes.clone() }
    }
}

impl From<models::expense::Model> for Expense {
    fn from(m: models::expense::Model) -> Self {
        Self { date: m.expense_date, amount: m.amount, category: m.category.into(), notes: m.notes }
    }
}

/// Gateway aggregation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

impl From<models::expense::CategoryTotalRow> for CategoryTotal {
    fn from(r: models::expense::CategoryTotalRow) -> Self {
        Self { category: r.category.into(), total: r.total }
    }
}

/// Reject entries that may never reach the store: negative, non-finite or oversized amounts.
pub fn validate_entries(entries: &[ExpenseEntry]) -> Result<(), ServiceError> {
    for (idx, e) in entries.iter().enumerate() {
        if !e.amount.is_finite() {
            return Err(ServiceError::Validation(format!("entry {idx}: amount must be a finite number")));
        }
        if e.amount < 0.0 {
            return Err(ServiceError::Validation(format!("entry {idx}: amount must be >= 0, got {}", e.amount)));
        }
        if e.amount > MAX_AMOUNT {
            return Err(ServiceError::Validation(format!(
                "entry {idx}: amount must be <= {MAX_AMOUNT}, got {}",
                e.amount
            )));
        }
    }
    Ok(())
}

/// Attach percentages to per-category totals.
///
/// `percentage = total / grand_total * 100`, or 0 for every row when the grand total is 0.
/// Rows come back in category order. A non-finite total is a store fault, never a row.
pub fn category_breakdown(rows: Vec<CategoryTotal>) -> Result<Vec<CategorySummary>, ServiceError> {
    let grand_total: f64 = rows.iter().map(|r| r.total).sum();
    if !grand_total.is_finite() {
        return Err(ServiceError::store("summarize", format!("category totals overflowed ({grand_total})")));
    }
    let mut out: Vec<CategorySummary> = rows
        .into_iter()
        .map(|r| {
            let percentage = if grand_total != 0.0 { r.total / grand_total * 100.0 } else { 0.0 };
            CategorySummary { category: r.category, total: r.total, percentage }
        })
        .collect();
    out.sort_by_key(|s| s.category);
    Ok(out)
}

/// Sum expenses per calendar month, ascending. Months without records are absent.
pub fn monthly_totals(expenses: &[Expense]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for e in expenses {
        *by_month.entry((e.date.year(), e.date.month())).or_insert(0.0) += e.amount;
    }
    by_month
        .into_iter()
        .map(|((y, m), total)| MonthlyTotal { month: format!("{y:04}-{m:02}"), total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn breakdown_splits_evenly() {
        let out = category_breakdown(vec![
            CategoryTotal { category: Category::Shopping, total: 20.0 },
            CategoryTotal { category: Category::Food, total: 20.0 },
        ])
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, Category::Food);
        assert!(close(out[0].percentage, 50.0));
        assert!(close(out[1].percentage, 50.0));
    }

    #[test]
    fn breakdown_third_and_two_thirds() {
        let out = category_breakdown(vec![
            CategoryTotal { category: Category::Shopping, total: 10.0 },
            CategoryTotal { category: Category::Food, total: 20.0 },
        ])
        .unwrap();
        let food = out.iter().find(|s| s.category == Category::Food).unwrap();
        let shopping = out.iter().find(|s| s.category == Category::Shopping).unwrap();
        assert!((food.percentage - 66.67).abs() < 0.01);
        assert!((shopping.percentage - 33.33).abs() < 0.01);
        let sum: f64 = out.iter().map(|s| s.percentage).sum();
        assert!(close(sum, 100.0));
    }

    #[test]
    fn breakdown_all_zero_totals_yield_zero_percent() {
        let out = category_breakdown(vec![
            CategoryTotal { category: Category::Rent, total: 0.0 },
            CategoryTotal { category: Category::Other, total: 0.0 },
        ])
        .unwrap();
        assert!(out.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn breakdown_of_nothing_is_empty() {
        assert!(category_breakdown(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn validation_rejects_negative_and_nan() {
        assert!(validate_entries(&[ExpenseEntry::new(0.0, Category::Food, "")]).is_ok());
        assert!(matches!(
            validate_entries(&[ExpenseEntry::new(-1.0, Category::Food, "")]),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            validate_entries(&[ExpenseEntry::new(f64::NAN, Category::Food, "")]),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn validation_caps_amounts() {
        assert!(validate_entries(&[ExpenseEntry::new(MAX_AMOUNT, Category::Rent, "")]).is_ok());
        assert!(matches!(
            validate_entries(&[ExpenseEntry::new(1e308, Category::Food, "")]),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn breakdown_refuses_overflowing_totals() {
        let res = category_breakdown(vec![
            CategoryTotal { category: Category::Food, total: f64::MAX },
            CategoryTotal { category: Category::Rent, total: f64::MAX },
        ]);
        assert!(matches!(res, Err(ServiceError::Store { .. })));
    }

    #[test]
    fn monthly_totals_group_by_month() {
        let e = |d: NaiveDate, amount: f64| Expense { date: d, amount, category: Category::Food, notes: String::new() };
        let out = monthly_totals(&[
            e(day(2024, 9, 3), 5.0),
            e(day(2024, 8, 1), 10.0),
            e(day(2024, 8, 31), 2.5),
        ]);
        assert_eq!(
            out,
            vec![
                MonthlyTotal { month: "2024-08".into(), total: 12.5 },
                MonthlyTotal { month: "2024-09".into(), total: 5.0 },
            ]
        );
    }
}
