//! User row type.

use chrono::{DateTime, Utc};

use bluefin_core::{Email, UserId};

/// A customer account.
///
/// `password_hash` is `None` for accounts created through Google sign-in
/// that never set a password. The hash never leaves the db/services layer;
/// route responses are built from [`crate::routes::users::ProfileResponse`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique).
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Argon2id hash, absent for Google-only accounts.
    pub password_hash: Option<String>,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    /// Google account id, set once the account is linked.
    pub google_id: Option<String>,
    /// "email", "google", or "email_and_google".
    pub auth_provider: String,
    /// Avatar URL from Google, if any.
    pub avatar: Option<String>,
    /// Loyalty point balance (whole points, never negative).
    pub points: i32,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        name.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("sam@example.com").expect("valid email"),
            first_name: "Sam".to_string(),
            last_name: "Rivers".to_string(),
            password_hash: None,
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            zip_code: String::new(),
            country: String::new(),
            google_id: None,
            auth_provider: "email".to_string(),
            avatar: None,
            points: 0,
            is_admin: false,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Sam Rivers");
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let mut user = sample_user();
        user.last_name = String::new();
        assert_eq!(user.full_name(), "Sam");
    }
}
