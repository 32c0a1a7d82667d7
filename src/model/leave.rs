use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// One-way state machine: pending -> approved or pending -> rejected, both
/// terminal.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    ToSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "start_date": "2024-06-03",
        "end_date": "2024-06-07",
        "days": 5,
        "status": "pending"
    })
)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2024-06-03", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2024-06-07", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Business-day count, persisted at submission time.
    #[schema(example = 5)]
    pub days: i64,

    #[schema(example = "pending", value_type = String)]
    pub status: LeaveStatus,
}
