use std::fmt;

use sea_orm::{entity::prelude::*, FromQueryResult, NotSet, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use common::types::Category as WireCategory;

use crate::errors::ModelError;

/// Stored form of `common::types::Category` (`varchar(32)` holding the name).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Category {
    #[sea_orm(string_value = "Rent")]
    Rent,
    #[sea_orm(string_value = "Food")]
    Food,
    #[sea_orm(string_value = "Shopping")]
    Shopping,
    #[sea_orm(string_value = "Entertainment")]
    Entertainment,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rent => "Rent",
            Category::Food => "Food",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WireCategory> for Category {
    fn from(c: WireCategory) -> Self {
        match c {
            WireCategory::Rent => Category::Rent,
            WireCategory::Food => Category::Food,
            WireCategory::Shopping => Category::Shopping,
            WireCategory::Entertainment => Category::Entertainment,
            WireCategory::Other => Category::Other,
        }
    }
}

impl From<Category> for WireCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::Rent => WireCategory::Rent,
            Category::Food => WireCategory::Food,
            Category::Shopping => WireCategory::Shopping,
            Category::Entertainment => WireCategory::Entertainment,
            Category::Other => WireCategory::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub expense_date: Date,
    pub amount: f64,
    pub category: Category,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// One `GROUP BY category` row.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CategoryTotalRow {
    pub category: Category,
    pub total: f64,
}

/// All records stored for `date`, in insertion order.
pub async fn find_for_date<C: ConnectionTrait>(db: &C, date: Date) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .filter(Column::ExpenseDate.eq(date))
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Records with `start <= expense_date <= end`, ordered by date then insertion.
pub async fn find_in_range<C: ConnectionTrait>(db: &C, start: Date, end: Date) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .filter(Column::ExpenseDate.between(start, end))
        .order_by_asc(Column::ExpenseDate)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    date: Date,
    amount: f64,
    category: Category,
    notes: &str,
) -> Result<Model, ModelError> {
    if !amount.is_finite() {
        return Err(ModelError::Validation("amount must be a finite number".into()));
    }
    let am = ActiveModel {
        id: NotSet,
        expense_date: Set(date),
        amount: Set(amount),
        category: Set(category),
        notes: Set(notes.to_string()),
    };
    Ok(am.insert(db).await?)
}

/// Remove every record for `date`; returns how many rows went away (0 is fine).
pub async fn delete_for_date<C: ConnectionTrait>(db: &C, date: Date) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ExpenseDate.eq(date))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// Per-category sums over the inclusive range. Categories without records are absent.
pub async fn summarize_by_category<C: ConnectionTrait>(
    db: &C,
    start: Date,
    end: Date,
) -> Result<Vec<CategoryTotalRow>, ModelError> {
    let rows = Entity::find()
        .select_only()
        .column(Column::Category)
        .column_as(Column::Amount.sum(), "total")
        .filter(Column::ExpenseDate.between(start, end))
        .group_by(Column::Category)
        .order_by_asc(Column::Category)
        .into_model::<CategoryTotalRow>()
        .all(db)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn category_serializes_as_plain_name() {
        let json = serde_json::to_string(&Category::Entertainment).unwrap();
        assert_eq!(json, "\"Entertainment\"");
        let back: Category = serde_json::from_str("\"Rent\"").unwrap();
        assert_eq!(back, Category::Rent);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(serde_json::from_str::<Category>("\"Utilities\"").is_err());
        assert!(serde_json::from_str::<Category>("123").is_err());
    }

    #[test]
    fn category_iter_covers_all_five() {
        let names: Vec<&str> = Category::iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Shopping", "Entertainment", "Other"]);
    }

    #[test]
    fn stored_and_wire_categories_share_names() {
        for wire in WireCategory::ALL {
            let stored = Category::from(wire);
            assert_eq!(stored.as_str(), wire.as_str());
            assert_eq!(WireCategory::from(stored), wire);
        }
    }
}
