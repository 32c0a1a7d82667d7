use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::employee::{DEFAULT_LEAVE_BALANCE, Employee};
use crate::model::role::Principal;
use crate::utils::identity_cache::{EmployeeIdentity, IdentityCache};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub joining_date: chrono::NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct EmployeeQuery {
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = 15)]
    pub balance: i64,
}

/// Create Employee (HR)
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<IdentityCache>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, email, department, joining_date, leave_balance)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.department)
    .bind(payload.joining_date)
    .bind(DEFAULT_LEAVE_BALANCE)
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(ApiError::Conflict("email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, email, department, joining_date, leave_balance FROM employees WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool.get_ref())
    .await?;

    cache
        .insert(EmployeeIdentity {
            id: employee.id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
        })
        .await;

    info!(employee_id = employee.id, "employee created");

    Ok(HttpResponse::Created().json(employee))
}

/// List Employees (HR)
#[utoipa::path(
    get,
    path = "/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, email, department, joining_date, leave_balance
        FROM employees
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

async fn fetch_balance(pool: &SqlitePool, employee_id: i64) -> Result<i64, ApiError> {
    sqlx::query_scalar("SELECT leave_balance FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("employee"))
}

/// Balance lookup by id. HR may query anyone; an employee only themselves.
#[utoipa::path(
    get,
    path = "/employees/{id}/balance",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_balance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    match auth.principal {
        Principal::Hr => {}
        Principal::Employee(own_id) if own_id == employee_id => {}
        Principal::Employee(_) => {
            return Err(ApiError::Forbidden("You can only check your own balance"));
        }
    }

    let balance = fetch_balance(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        balance,
    }))
}

/// Balance of the authenticated employee.
#[utoipa::path(
    get,
    path = "/employee/balance",
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn my_balance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.require_employee()?;
    let balance = fetch_balance(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        balance,
    }))
}
