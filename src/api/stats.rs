use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::LeaveStatus;

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = 12)]
    pub total_employees: i64,
    #[schema(example = 30)]
    pub total_leaves: i64,
    #[schema(example = 4)]
    pub pending_leaves: i64,
    #[schema(example = 20)]
    pub approved_leaves: i64,
    #[schema(example = 6)]
    pub rejected_leaves: i64,
}

/// System statistics (HR).
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Aggregate counts", body = StatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Stats"
)]
pub async fn get_stats(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let total_employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let by_status: Vec<(LeaveStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM leaves GROUP BY status")
            .fetch_all(pool.get_ref())
            .await?;

    let mut stats = StatsResponse {
        total_employees,
        total_leaves: 0,
        pending_leaves: 0,
        approved_leaves: 0,
        rejected_leaves: 0,
    };

    for (status, count) in by_status {
        stats.total_leaves += count;
        match status {
            LeaveStatus::Pending => stats.pending_leaves = count,
            LeaveStatus::Approved => stats.approved_leaves = count,
            LeaveStatus::Rejected => stats.rejected_leaves = count,
        }
    }

    Ok(HttpResponse::Ok().json(stats))
}
