//! Expense module: domain, gateway seam, gateway implementations and service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use repository::ExpenseGateway;
pub use service::ExpenseService;
