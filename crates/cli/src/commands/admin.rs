//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user (password generated and logged)
//! bluefin-cli admin create -e admin@example.com -f Ava -l Brook
//!
//! # Promote an existing account, setting a known password
//! bluefin-cli admin create -e owner@example.com -p 'a-strong-password'
//! ```
//!
//! # Environment Variables
//!
//! - `BLUEFIN_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use rand::{Rng, distr::Alphanumeric};
use sqlx::PgPool;
use thiserror::Error;

use bluefin_api::services::auth::hash_password;
use bluefin_core::Email;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,
}

/// Create a new admin user, or promote an existing account to admin.
///
/// When the email already exists the account keeps its profile and gains
/// the admin flag (and the new password). When `password` is omitted a
/// random one is generated and logged.
///
/// # Errors
///
/// Returns `AdminError` if the email is invalid, hashing fails, or the
/// database is unreachable.
pub async fn create_user(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: Option<&str>,
) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let password = password.map_or_else(generate_password, str::to_owned);
    let password_hash = hash_password(&password).map_err(|_| AdminError::PasswordHash)?;

    let database_url = std::env::var("BLUEFIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("BLUEFIN_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE users
                 SET is_admin = TRUE,
                     password_hash = $2,
                     first_name = CASE WHEN first_name = '' THEN $3 ELSE first_name END,
                     last_name  = CASE WHEN last_name  = '' THEN $4 ELSE last_name  END,
                     auth_provider = CASE
                         WHEN google_id IS NULL THEN auth_provider
                         ELSE 'email_and_google'
                     END
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&password_hash)
            .bind(first_name)
            .bind(last_name)
            .execute(&pool)
            .await?;

            tracing::info!(user_id = id, %email, "existing account promoted to admin");
        }
        None => {
            let id: i32 = sqlx::query_scalar(
                "INSERT INTO users (email, first_name, last_name, password_hash, is_admin)
                 VALUES ($1, $2, $3, $4, TRUE)
                 RETURNING id",
            )
            .bind(&email)
            .bind(first_name)
            .bind(last_name)
            .bind(&password_hash)
            .fetch_one(&pool)
            .await?;

            tracing::info!(user_id = id, %email, "admin account created");
        }
    }

    tracing::info!(%email, password = %password, "admin credentials (store them now, the password is not saved in clear)");

    Ok(())
}

/// Generate a random 16-character alphanumeric password.
fn generate_password() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
