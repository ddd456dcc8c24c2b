//! Service layer of the expense tracker.
//! - `expense::repository` defines the store gateway seam and an in-memory gateway.
//! - `expense::repo::seaorm` is the Postgres gateway.
//! - `expense::service` holds the business rules (replace semantics, breakdowns).

pub mod errors;
pub mod retry;
pub mod expense;
#[cfg(test)]
pub mod test_support;
