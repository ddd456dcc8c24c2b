use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Handler-level error. Maps every failure onto 422, 404, 500 or 503 with a
/// `{"detail": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// `context` names the operation and its parameters for the log line.
    #[error("{context}: {source}")]
    Service { context: String, source: ServiceError },
}

impl ApiError {
    pub fn service(context: impl Into<String>, source: ServiceError) -> Self {
        Self::Service { context: context.into(), source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Service { source, .. } => match source {
                ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                ServiceError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) => {
                debug!(%status, detail = %msg, "request rejected");
                msg.clone()
            }
            ApiError::Service { context, source } => match source {
                ServiceError::Validation(msg) => {
                    debug!(%status, %context, detail = %msg, "request rejected");
                    msg.clone()
                }
                ServiceError::Store { .. } => {
                    error!(%context, error = %source, "store fault");
                    "Database error: failed to access the expense store".to_string()
                }
                ServiceError::Timeout { .. } => {
                    warn!(%context, error = %source, "store timeout");
                    "Database error: the expense store timed out".to_string()
                }
            },
        };
        (status, Json(ErrorBody::new(detail))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn statuses_stay_distinct() {
        assert_eq!(ApiError::Validation("bad".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ApiError::NotFound("none".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::service("get_expenses", ServiceError::store("list_for_date", "down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::service("analytics", ServiceError::Timeout { op: "summarize", after: Duration::from_secs(5) })
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::service("update_expenses", ServiceError::Validation("amount".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
