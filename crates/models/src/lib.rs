//! Persistence model of the expense tracker: the `expenses` entity, its
//! parameterized queries and the pooled connection.

pub mod errors;
pub mod db;
pub mod expense;

#[cfg(test)]
mod tests;
