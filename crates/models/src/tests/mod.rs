//! Postgres-backed query tests. They skip when `SKIP_DB_TESTS` is set or the
//! `DB_*` settings are not available.

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::db::{connect_with_config, ensure_schema};
use crate::expense::{self, Category};

async fn test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let mut cfg = configs::DatabaseConfig::default();
    if cfg.normalize_from_env().is_err() || cfg.validate().is_err() {
        eprintln!("skip: DB_* settings not provided");
        return None;
    }
    let db = match connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = ensure_schema(&db).await {
        eprintln!("skip: ensure schema failed: {}", e);
        return None;
    }
    Some(db)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn insert_then_find_round_trip() -> anyhow::Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let date = day(2091, 3, 14);
    expense::delete_for_date(&db, date).await?;

    expense::insert(&db, date, 10.0, Category::Shopping, "x").await?;
    let rows = expense::find_for_date(&db, date).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 10.0);
    assert_eq!(rows[0].category, Category::Shopping);
    assert_eq!(rows[0].notes, "x");

    expense::delete_for_date(&db, date).await?;
    Ok(())
}

#[tokio::test]
async fn delete_is_idempotent() -> anyhow::Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let date = day(2091, 4, 1);
    expense::insert(&db, date, 3.5, Category::Other, "").await?;
    assert_eq!(expense::delete_for_date(&db, date).await?, 1);
    assert_eq!(expense::delete_for_date(&db, date).await?, 0);
    assert!(expense::find_for_date(&db, date).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn summarize_groups_inclusive_range() -> anyhow::Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let (d1, d2, outside) = (day(2092, 5, 1), day(2092, 5, 2), day(2092, 5, 3));
    for d in [d1, d2, outside] {
        expense::delete_for_date(&db, d).await?;
    }
    expense::insert(&db, d1, 20.0, Category::Food, "lunch").await?;
    expense::insert(&db, d2, 10.0, Category::Shopping, "a").await?;
    expense::insert(&db, d2, 10.0, Category::Shopping, "b").await?;
    expense::insert(&db, outside, 99.0, Category::Rent, "not counted").await?;

    let mut rows = expense::summarize_by_category(&db, d1, d2).await?;
    rows.sort_by_key(|r| r.category);
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].category, rows[0].total), (Category::Food, 20.0));
    assert_eq!((rows[1].category, rows[1].total), (Category::Shopping, 20.0));

    let in_range = expense::find_in_range(&db, d1, d2).await?;
    assert_eq!(in_range.len(), 3);
    assert_eq!(in_range[0].expense_date, d1);

    for d in [d1, d2, outside] {
        expense::delete_for_date(&db, d).await?;
    }
    Ok(())
}

#[tokio::test]
async fn rolled_back_transaction_leaves_no_rows() -> anyhow::Result<()> {
    let Some(db) = test_db().await else { return Ok(()) };
    let date = day(2093, 1, 9);
    expense::delete_for_date(&db, date).await?;

    let txn = db.begin().await?;
    expense::insert(&txn, date, 1.0, Category::Food, "tx").await?;
    txn.rollback().await?;

    assert!(expense::find_for_date(&db, date).await?.is_empty());
    Ok(())
}
