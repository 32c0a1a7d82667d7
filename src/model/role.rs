use serde::{Deserialize, Serialize};

/// Wire-level role tag carried inside token claims.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Hr,
}

/// Authenticated identity, resolved once at token verification. Handlers
/// match on the variant instead of re-deriving the role from claims.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Principal {
    Employee(i64),
    Hr,
}

/// Identity id reported for the HR account in login profiles. The MVP has no
/// HR table; this id only ever appears in profile payloads.
pub const HR_SENTINEL_ID: i64 = 999;
