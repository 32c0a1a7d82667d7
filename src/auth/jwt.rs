use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::model::role::{HR_SENTINEL_ID, Principal, Role};
use crate::models::Claims;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn issue_token(principal: Principal, secret: &str, ttl: usize) -> String {
    let (sub, role) = match principal {
        Principal::Employee(id) => (id.to_string(), Role::Employee),
        Principal::Hr => (HR_SENTINEL_ID.to_string(), Role::Hr),
    };

    let claims = Claims {
        sub,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Signature + expiry check. Expired tokens fail here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn employee_token_round_trips() {
        let token = issue_token(Principal::Employee(42), SECRET, 600);
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.principal(), Some(Principal::Employee(42)));
    }

    #[test]
    fn hr_token_resolves_to_hr_principal() {
        let token = issue_token(Principal::Hr, SECRET, 600);
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, HR_SENTINEL_ID.to_string());
        assert_eq!(claims.principal(), Some(Principal::Hr));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Principal::Hr, SECRET, 600);
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // exp far enough in the past to clear the default leeway
        let claims = Claims {
            sub: "1".to_string(),
            role: Role::Employee,
            exp: now() - 3600,
            jti: "expired".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }
}
