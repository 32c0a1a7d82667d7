use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Principal;

/// Authenticated caller, extracted from the bearer token per request.
pub struct AuthUser {
    pub principal: Principal,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ApiError::Unauthenticated("Missing bearer token").into())),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(ApiError::Internal.into())),
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => {
                return ready(Err(
                    ApiError::Unauthenticated("Invalid or expired token").into()
                ));
            }
        };

        let principal = match claims.principal() {
            Some(p) => p,
            None => {
                return ready(Err(
                    ApiError::Unauthenticated("Malformed token subject").into()
                ));
            }
        };

        ready(Ok(AuthUser { principal }))
    }
}

impl AuthUser {
    pub fn require_hr(&self) -> Result<(), ApiError> {
        match self.principal {
            Principal::Hr => Ok(()),
            _ => Err(ApiError::Forbidden("HR access required")),
        }
    }

    /// Returns the caller's employee id.
    pub fn require_employee(&self) -> Result<i64, ApiError> {
        match self.principal {
            Principal::Employee(id) => Ok(id),
            _ => Err(ApiError::Forbidden("Employee access required")),
        }
    }
}
