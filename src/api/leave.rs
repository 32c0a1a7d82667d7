use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::{LeaveRequest, LeaveStatus};
use crate::utils::business_days::business_days;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by leave status (pending, approved, rejected)
    pub status: Option<String>,
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page
    pub per_page: Option<u32>,
}

/// Ledger row joined with employee display fields, for the HR listing.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveWithEmployee {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    #[schema(example = "jane.doe@company.com")]
    pub employee_email: String,
    #[schema(example = "Engineering")]
    pub employee_department: String,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 5)]
    pub days: i64,
    #[schema(example = "pending", value_type = String)]
    pub status: LeaveStatus,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Submit leave request
========================= */

/// Validation and insert run in one transaction so the overlap and balance
/// checks always see committed state.
#[utoipa::path(
    post,
    path = "/employee/leaves",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Leave starts before joining date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Insufficient balance or overlapping request")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.require_employee()?;

    if payload.employee_id != employee_id {
        return Err(ApiError::Forbidden("You can only apply for your own leave"));
    }

    let mut tx = pool.begin().await?;

    let employee: Option<(NaiveDate, i64)> =
        sqlx::query_as("SELECT joining_date, leave_balance FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (joining_date, leave_balance) = employee.ok_or(ApiError::NotFound("employee"))?;

    if payload.start_date < joining_date {
        return Err(ApiError::InvalidRequest(
            "leave cannot start before joining date".to_string(),
        ));
    }

    let days = business_days(payload.start_date, payload.end_date);

    if days > leave_balance {
        return Err(ApiError::InsufficientBalance {
            requested: days,
            available: leave_balance,
        });
    }

    // Inclusive-range overlap against any request still holding days.
    let overlap: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM leaves
        WHERE employee_id = ?
          AND status IN ('pending', 'approved')
          AND start_date <= ?
          AND end_date >= ?
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .bind(payload.end_date)
    .bind(payload.start_date)
    .fetch_optional(&mut *tx)
    .await?;

    if overlap.is_some() {
        return Err(ApiError::OverlapConflict);
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO leaves (employee_id, start_date, end_date, days, status)
        VALUES (?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(days)
    .execute(&mut *tx)
    .await?;

    let leave = sqlx::query_as::<_, LeaveRequest>(
        "SELECT id, employee_id, start_date, end_date, days, status FROM leaves WHERE id = ?",
    )
    .bind(inserted.last_insert_rowid())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(employee_id, leave_id = leave.id, days, "leave request submitted");

    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Approve / reject (HR)
========================= */

/// Loads the pending row and returns (employee_id, days), or fails. Runs
/// inside the caller's transaction.
async fn take_pending(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    leave_id: i64,
) -> Result<(i64, i64), ApiError> {
    let leave: Option<(i64, i64, LeaveStatus)> =
        sqlx::query_as("SELECT employee_id, days, status FROM leaves WHERE id = ?")
            .bind(leave_id)
            .fetch_optional(&mut **tx)
            .await?;

    let (employee_id, days, status) = leave.ok_or(ApiError::NotFound("leave request"))?;

    if status != LeaveStatus::Pending {
        return Err(ApiError::InvalidState);
    }

    Ok((employee_id, days))
}

/// Approve: decrement the employee's balance by the persisted day count and
/// flip the status, atomically.
#[utoipa::path(
    post,
    path = "/leaves/{id}/approve",
    params(("id" = i64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave approved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let leave_id = path.into_inner();
    let mut tx = pool.begin().await?;

    let (employee_id, days) = take_pending(&mut tx, leave_id).await?;

    sqlx::query("UPDATE employees SET leave_balance = leave_balance - ? WHERE id = ?")
        .bind(days)
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE leaves SET status = ? WHERE id = ?")
        .bind(LeaveStatus::Approved)
        .bind(leave_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(leave_id, employee_id, days, "leave approved");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "approved" })))
}

/// Reject: terminal status flip, no balance effect.
#[utoipa::path(
    post,
    path = "/leaves/{id}/reject",
    params(("id" = i64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let leave_id = path.into_inner();
    let mut tx = pool.begin().await?;

    let (employee_id, _days) = take_pending(&mut tx, leave_id).await?;

    sqlx::query("UPDATE leaves SET status = ? WHERE id = ?")
        .bind(LeaveStatus::Rejected)
        .bind(leave_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(leave_id, employee_id, "leave rejected");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "rejected" })))
}

/* =========================
Listings
========================= */

/// Full ledger joined with employee display fields (HR).
#[utoipa::path(
    get,
    path = "/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leaves(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let status = match query.status.as_deref() {
        Some(s) => Some(
            s.parse::<LeaveStatus>()
                .map_err(|_| ApiError::InvalidRequest(format!("unknown status: {s}")))?,
        ),
        None => None,
    };

    let mut where_sql = String::new();
    if status.is_some() {
        where_sql.push_str(" WHERE l.status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM leaves l{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = status {
        count_q = count_q.bind(status);
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        r#"
        SELECT
            l.id, l.employee_id,
            e.name AS employee_name,
            e.email AS employee_email,
            e.department AS employee_department,
            l.start_date, l.end_date, l.days, l.status
        FROM leaves l
        JOIN employees e ON e.id = l.employee_id
        {where_sql}
        ORDER BY l.id DESC
        LIMIT ? OFFSET ?
        "#
    );
    let mut data_q = sqlx::query_as::<_, LeaveWithEmployee>(&data_sql);
    if let Some(status) = status {
        data_q = data_q.bind(status);
    }
    let leaves = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}

/// The authenticated employee's own requests.
#[utoipa::path(
    get,
    path = "/employee/leaves",
    responses(
        (status = 200, description = "Leave requests of the caller", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.require_employee()?;

    let leaves = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, start_date, end_date, days, status
        FROM leaves
        WHERE employee_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(leaves))
}
