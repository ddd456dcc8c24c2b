use axum::extract::State;
use axum::Json;
use service::expense::domain::{CategorySummary, DateRange, MonthlyTotal};

use crate::errors::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;

fn ordered(range: DateRange) -> Result<DateRange, ApiError> {
    if range.is_ordered() {
        Ok(range)
    } else {
        Err(ApiError::Validation(format!(
            "start_date {} is after end_date {}",
            range.start_date, range.end_date
        )))
    }
}

#[utoipa::path(
    post,
    path = "/analytics/",
    tag = "analytics",
    request_body = crate::openapi::DateRangeDoc,
    responses(
        (status = 200, description = "Per-category totals and shares", body = [crate::openapi::CategorySummaryDoc]),
        (status = 404, description = "No expenses in range", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "Malformed or inverted range", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Store fault", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    ValidJson(range): ValidJson<DateRange>,
) -> Result<Json<Vec<CategorySummary>>, ApiError> {
    let DateRange { start_date, end_date } = ordered(range)?;
    let summary = state
        .expenses
        .summarize_range(start_date, end_date)
        .await
        .map_err(|e| ApiError::service(format!("analytics {start_date}..={end_date}"), e))?;
    if summary.is_empty() {
        return Err(ApiError::NotFound("No expenses found for this date range".into()));
    }
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/analytics/monthly",
    tag = "analytics",
    request_body = crate::openapi::DateRangeDoc,
    responses(
        (status = 200, description = "Per-month totals, ascending", body = [crate::openapi::MonthlyTotalDoc]),
        (status = 404, description = "No expenses in range", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "Malformed or inverted range", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_monthly_analytics(
    State(state): State<AppState>,
    ValidJson(range): ValidJson<DateRange>,
) -> Result<Json<Vec<MonthlyTotal>>, ApiError> {
    let DateRange { start_date, end_date } = ordered(range)?;
    let months = state
        .expenses
        .summarize_monthly(start_date, end_date)
        .await
        .map_err(|e| ApiError::service(format!("monthly_analytics {start_date}..={end_date}"), e))?;
    if months.is_empty() {
        return Err(ApiError::NotFound("No expenses found for this date range".into()));
    }
    Ok(Json(months))
}
