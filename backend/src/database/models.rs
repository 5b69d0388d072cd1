//! Rust structs that represent database table mappings.
//!
//! These models define the structure of credential data as it is stored in
//! and retrieved from the database. Note that these differ from the
//! API-specific models in `auth::models`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a registered user, assigned by the credential repository.
///
/// Serialized as a decimal string so it can travel as the JWT `sub` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(UserId)
    }
}

impl TryFrom<String> for UserId {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.to_string()
    }
}

/// A credential row as read back from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct StoredCredential {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

impl StoredCredential {
    pub fn user_id(&self) -> UserId {
        UserId(self.id as u64)
    }
}

/// A credential ready to be persisted. Only ever holds a real hash.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_string() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "\"42\"");

        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId(42));
    }

    #[test]
    fn test_user_id_rejects_non_numeric() {
        assert!(serde_json::from_str::<UserId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<UserId>("\"-1\"").is_err());
    }
}
