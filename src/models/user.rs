use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role attached to a user account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account: owns pathways, tracks its own progress.
    Member,
    /// May additionally reset any user's progress records.
    Admin,
}

/// A user account. Accounts are soft-deactivated, never deleted, so
/// pathway ownership and progress history stay referentially intact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never exposed in JSON.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a new account row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Payload for `PUT /api/users/me`. Both fields optional; absent fields
/// are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_validation() {
        let valid = UpdateProfileRequest {
            email: Some("new@example.com".to_string()),
            password: None,
        };
        assert!(valid.validate().is_ok());

        let empty = UpdateProfileRequest {
            email: None,
            password: None,
        };
        assert!(empty.validate().is_ok());

        let bad_email = UpdateProfileRequest {
            email: Some("not-an-email".to_string()),
            password: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = UpdateProfileRequest {
            email: None,
            password: Some("123".to_string()),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: UserRole::Member,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
        assert!(json.contains("\"alice\""));
    }
}
