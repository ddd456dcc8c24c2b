//! Extractors that turn every malformed input into a 422 with a `detail` body,
//! instead of axum's mix of 400/415/422.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use chrono::NaiveDate;
use common::types::iso_date;
use serde::de::DeserializeOwned;

use crate::errors::ApiError;

/// `{expense_date}` path segment parsed as an ISO calendar date.
#[derive(Debug, Clone, Copy)]
pub struct ExpenseDate(pub NaiveDate);

#[async_trait]
impl<S> FromRequestParts<S> for ExpenseDate
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        parse_date(&raw).map(ExpenseDate)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    iso_date::parse(raw).map_err(ApiError::Validation)
}

/// JSON body whose rejection (syntax, shape, content type) is always a 422.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(parse_date("2024-08-15").unwrap(), NaiveDate::from_ymd_opt(2024, 8, 15).unwrap());
        assert!(parse_date("invalid-date").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("15/08/2024").is_err());
        assert!(parse_date("2024-8-5").is_err());
    }
}
