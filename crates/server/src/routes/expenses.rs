use axum::extract::State;
use axum::Json;
use common::types::MessageBody;
use service::expense::domain::ExpenseEntry;

use crate::errors::ApiError;
use crate::extract::{ExpenseDate, ValidJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/expenses/{expense_date}",
    tag = "expenses",
    params(("expense_date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Expenses recorded on the date", body = [crate::openapi::ExpenseEntryDoc]),
        (status = 404, description = "Nothing recorded on the date", body = crate::openapi::ErrorBodyDoc),
        (status = 422, description = "Malformed date", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Store fault", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_expenses(
    State(state): State<AppState>,
    ExpenseDate(date): ExpenseDate,
) -> Result<Json<Vec<ExpenseEntry>>, ApiError> {
    let rows = state
        .expenses
        .get_expenses_for_date(date)
        .await
        .map_err(|e| ApiError::service(format!("get_expenses date={date}"), e))?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("No expenses found for this date".into()));
    }
    Ok(Json(rows.iter().map(|e| e.entry()).collect()))
}

#[utoipa::path(
    post,
    path = "/expenses/{expense_date}",
    tag = "expenses",
    params(("expense_date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    request_body = [crate::openapi::ExpenseEntryDoc],
    responses(
        (status = 200, description = "Date now holds exactly the submitted list", body = crate::openapi::MessageBodyDoc),
        (status = 422, description = "Malformed date or body", body = crate::openapi::ErrorBodyDoc),
        (status = 500, description = "Store fault, prior state kept", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn add_or_update_expenses(
    State(state): State<AppState>,
    ExpenseDate(date): ExpenseDate,
    ValidJson(entries): ValidJson<Vec<ExpenseEntry>>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .expenses
        .replace_expenses_for_date(date, entries)
        .await
        .map_err(|e| ApiError::service(format!("update_expenses date={date}"), e))?;
    Ok(Json(MessageBody::new("Expenses updated successfully")))
}
