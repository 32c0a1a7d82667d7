use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use crate::auth::jwt::issue_token;
use crate::auth::password::verify_password;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::{HR_SENTINEL_ID, Principal};
use crate::models::{EmployeeLoginReq, HrLoginReq, LoginResponse};
use crate::utils::identity_cache::IdentityCache;

/// Employee login: supplied email and numeric id must both match a stored
/// employee. Not a password scheme; this is the MVP credential model.
#[utoipa::path(
    post,
    path = "/auth/employee/login",
    request_body = EmployeeLoginReq,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "employee_login",
    skip(body, pool, cache, config),
    fields(employee_id = body.employee_id)
)]
pub async fn employee_login(
    body: web::Json<EmployeeLoginReq>,
    pool: web::Data<SqlitePool>,
    cache: web::Data<IdentityCache>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let identity = cache
        .resolve(pool.get_ref(), body.employee_id)
        .await?
        .ok_or(ApiError::Unauthenticated("Invalid credentials"))?;

    if !identity.email.eq_ignore_ascii_case(body.email.trim()) {
        info!("Invalid credentials: email mismatch");
        return Err(ApiError::Unauthenticated("Invalid credentials"));
    }

    // Balance is mutable state; always read it fresh for the profile.
    let balance: i64 =
        sqlx::query_scalar("SELECT leave_balance FROM employees WHERE id = ?")
            .bind(identity.id)
            .fetch_one(pool.get_ref())
            .await?;

    debug!("Credentials verified, issuing token");

    let token = issue_token(
        Principal::Employee(identity.id),
        &config.jwt_secret,
        config.token_ttl,
    );

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: json!({
            "id": identity.id,
            "name": identity.name,
            "email": identity.email,
            "department": identity.department,
            "leave_balance": balance,
        }),
    }))
}

/// HR login against the single configured credential pair.
#[utoipa::path(
    post,
    path = "/auth/hr/login",
    request_body = HrLoginReq,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "hr_login", skip(body, config))]
pub async fn hr_login(
    body: web::Json<HrLoginReq>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if body.username != config.hr_username
        || !verify_password(&body.password, &config.hr_password_hash)
    {
        info!("Invalid credentials");
        return Err(ApiError::Unauthenticated("Invalid credentials"));
    }

    let token = issue_token(Principal::Hr, &config.jwt_secret, config.token_ttl);

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: json!({
            "id": HR_SENTINEL_ID,
            "name": "HR Admin",
            "role": "hr",
        }),
    }))
}
