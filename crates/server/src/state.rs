use std::sync::Arc;

use service::expense::{ExpenseGateway, ExpenseService};
use service::retry::RetryPolicy;

/// Shared handler state: the expense service over whichever gateway the process chose.
#[derive(Clone)]
pub struct AppState {
    pub expenses: Arc<ExpenseService<dyn ExpenseGateway>>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ExpenseGateway>, retry: RetryPolicy) -> Self {
        Self { expenses: Arc::new(ExpenseService::new(gateway, retry)) }
    }
}
