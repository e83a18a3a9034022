// src/models/user.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user record as stored in the `users` table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-generated identifier
    pub id: i32,

    pub name: String,

    /// Unique across all users; enforced by the database
    pub email: String,

    /// Set by the database on insert
    pub created_at: DateTime<Utc>,
}

// DTO for creating a new user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_serializes_in_camel_case() {
        let created_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let user = User {
            id: 1,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            created_at,
        };

        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Jane Doe",
                "email": "jane@example.com",
                "createdAt": "2024-05-01T10:00:00Z",
            })
        );
    }
}
