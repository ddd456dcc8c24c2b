use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// One of `Rent`, `Food`, `Shopping`, `Entertainment`, `Other`.
#[derive(ToSchema)]
pub enum CategoryDoc {
    Rent,
    Food,
    Shopping,
    Entertainment,
    Other,
}

#[derive(ToSchema)]
pub struct ExpenseEntryDoc {
    pub amount: f64,
    pub category: CategoryDoc,
    pub notes: String,
}

#[derive(ToSchema)]
pub struct DateRangeDoc {
    /// YYYY-MM-DD, inclusive
    pub start_date: String,
    /// YYYY-MM-DD, inclusive
    pub end_date: String,
}

#[derive(ToSchema)]
pub struct CategorySummaryDoc {
    pub category: CategoryDoc,
    pub total: f64,
    pub percentage: f64,
}

#[derive(ToSchema)]
pub struct MonthlyTotalDoc {
    /// YYYY-MM
    pub month: String,
    pub total: f64,
}

#[derive(ToSchema)]
pub struct MessageBodyDoc {
    pub message: String,
}

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    pub detail: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::expenses::get_expenses,
        crate::routes::expenses::add_or_update_expenses,
        crate::routes::analytics::get_analytics,
        crate::routes::analytics::get_monthly_analytics,
    ),
    components(
        schemas(
            HealthResponse,
            CategoryDoc,
            ExpenseEntryDoc,
            DateRangeDoc,
            CategorySummaryDoc,
            MonthlyTotalDoc,
            MessageBodyDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "expenses"),
        (name = "analytics")
    )
)]
pub struct ApiDoc;
