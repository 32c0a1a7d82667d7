use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::{Principal, Role};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: employee id, or the HR sentinel id.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}

impl Claims {
    /// Resolve the tagged principal once; `None` on a malformed subject.
    pub fn principal(&self) -> Option<Principal> {
        match self.role {
            Role::Hr => Some(Principal::Hr),
            Role::Employee => self.sub.parse().ok().map(Principal::Employee),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EmployeeLoginReq {
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = 1)]
    pub employee_id: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct HrLoginReq {
    #[schema(example = "hr@company.com")]
    pub username: String,
    #[schema(example = "hr123")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Authenticated profile: the employee row, or the HR sentinel identity.
    #[schema(value_type = Object)]
    pub user: serde_json::Value,
}
