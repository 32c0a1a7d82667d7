use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;

/// Every failure an endpoint can surface. No retry, no recovery: each variant
/// aborts the triggering operation and the caller resubmits.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "{}", _0)]
    InvalidRequest(String),

    #[display(
        fmt = "insufficient leave balance: requested {} days, {} available",
        requested,
        available
    )]
    InsufficientBalance { requested: i64, available: i64 },

    #[display(fmt = "overlapping leave request")]
    OverlapConflict,

    #[display(fmt = "leave request already processed")]
    InvalidState,

    #[display(fmt = "{}", _0)]
    Conflict(&'static str),

    #[display(fmt = "{}", _0)]
    Unauthenticated(&'static str),

    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),

    #[display(fmt = "internal server error")]
    Internal,
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientBalance { .. }
            | ApiError::OverlapConflict
            | ApiError::InvalidState
            | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database error");
        ApiError::Internal
    }
}
