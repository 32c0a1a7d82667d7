use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::employee::{BalanceResponse, CreateEmployee, EmployeeListResponse};
use crate::api::leave::{CreateLeave, LeaveListResponse, LeaveWithEmployee};
use crate::api::stats::StatsResponse;
use crate::model::employee::Employee;
use crate::model::leave::LeaveRequest;
use crate::models::{EmployeeLoginReq, HrLoginReq, LoginResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

Employees request time off, HR approves or rejects requests, and balances
are tracked.

### Key Features
- **Employee Management**: HR creates and lists employee profiles
- **Leave Requests**: employees submit date ranges, validated against
  joining date, remaining balance and existing requests
- **Approval Pipeline**: one-shot approve/reject decisions with atomic
  balance adjustment
- **Reporting**: balance lookups and system-wide statistics

### Security
Endpoints are protected with **JWT Bearer authentication**; tokens are
issued by the role-specific login endpoints and expire after 30 minutes.
"#,
    ),
    paths(
        crate::auth::handlers::employee_login,
        crate::auth::handlers::hr_login,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_balance,
        crate::api::employee::my_balance,

        crate::api::leave::apply_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,
        crate::api::leave::list_leaves,
        crate::api::leave::my_leaves,

        crate::api::stats::get_stats,
    ),
    components(
        schemas(
            EmployeeLoginReq,
            HrLoginReq,
            LoginResponse,
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            BalanceResponse,
            LeaveRequest,
            CreateLeave,
            LeaveWithEmployee,
            LeaveListResponse,
            StatsResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login endpoints"),
        (name = "Employee", description = "Employee management and balance APIs"),
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Stats", description = "Reporting APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
