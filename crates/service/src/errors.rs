use std::time::Duration;

use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("store error during {op}: {detail}")]
    Store { op: &'static str, detail: String },
    #[error("store timeout during {op} after {after:?}")]
    Timeout { op: &'static str, after: Duration },
}

impl ServiceError {
    pub fn store(op: &'static str, detail: impl ToString) -> Self {
        Self::Store { op, detail: detail.to_string() }
    }

    /// Map a model-layer failure raised while running `op`.
    pub fn from_model(op: &'static str, err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Db(e) => Self::store(op, e),
        }
    }

    /// Store faults that may succeed when tried again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_faults_are_transient() {
        assert!(ServiceError::store("summarize", "connection refused").is_transient());
        assert!(ServiceError::Timeout { op: "summarize", after: Duration::from_secs(1) }.is_transient());
        assert!(!ServiceError::Validation("bad".into()).is_transient());
    }

    #[test]
    fn model_validation_stays_validation() {
        let e = ServiceError::from_model("insert", ModelError::Validation("amount".into()));
        assert!(matches!(e, ServiceError::Validation(_)));
    }
}
