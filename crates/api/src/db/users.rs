//! User repository for database operations.
//!
//! Covers accounts, loyalty balance adjustments, and password reset codes.

use sqlx::PgPool;

use bluefin_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// All user columns, kept in sync with [`User`].
const USER_COLUMNS: &str = "id, email, first_name, last_name, password_hash, phone, address, \
     city, zip_code, country, google_id, auth_provider, avatar, points, \
     is_admin, is_active, created_at, last_login";

/// Parameters for creating a password-based account.
pub struct CreateUser<'a> {
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub city: &'a str,
}

/// Parameters for creating an account from a Google sign-in.
pub struct CreateGoogleUser<'a> {
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub google_id: &'a str,
    pub avatar: Option<&'a str>,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their linked Google account id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new password-based account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, params: CreateUser<'_>) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, first_name, last_name, password_hash, phone, address, city)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.email)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.password_hash)
        .bind(params.phone)
        .bind(params.address)
        .bind(params.city)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }

    /// Create an account from a verified Google sign-in (no password).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or Google id already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_google(
        &self,
        params: CreateGoogleUser<'_>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, first_name, last_name, google_id, avatar, auth_provider)
             VALUES ($1, $2, $3, $4, $5, 'google')
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.email)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.google_id)
        .bind(params.avatar)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("account already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }

    /// Link a Google account to an existing email account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn link_google(
        &self,
        user_id: UserId,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET google_id = $2,
                 avatar = COALESCE($3, avatar),
                 auth_provider = CASE
                     WHEN password_hash IS NULL THEN 'google'
                     ELSE 'email_and_google'
                 END
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(google_id)
        .bind(avatar)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(user)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &UpdateProfile,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name  = COALESCE($3, last_name),
                 phone      = COALESCE($4, phone),
                 address    = COALESCE($5, address),
                 city       = COALESCE($6, city),
                 zip_code   = COALESCE($7, zip_code),
                 country    = COALESCE($8, country)
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.address.as_deref())
        .bind(update.city.as_deref())
        .bind(update.zip_code.as_deref())
        .bind(update.country.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(user)
    }

    /// Replace the user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users
             SET password_hash = $2,
                 auth_provider = CASE
                     WHEN google_id IS NULL THEN auth_provider
                     ELSE 'email_and_google'
                 END
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// List all users, newest first (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Total number of accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Adjust a loyalty balance and record the movement in history.
    ///
    /// The balance is clamped at zero. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn adjust_points(
        &self,
        user_id: UserId,
        amount: i32,
        action: &str,
        admin_id: Option<UserId>,
        reason: Option<&str>,
    ) -> Result<i32, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let new_balance: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET points = GREATEST(points + $2, 0) WHERE id = $1 RETURNING points",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(new_balance) = new_balance else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query(
            "INSERT INTO points_history (user_id, admin_id, action, amount, reason)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(admin_id)
        .bind(action)
        .bind(amount)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(new_balance)
    }

    /// List the loyalty history of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn points_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<crate::models::PointsEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, crate::models::PointsEntry>(
            "SELECT id, user_id, admin_id, action, amount, reason, created_at
             FROM points_history
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    // =========================================================================
    // Password reset codes
    // =========================================================================

    /// Store a new reset code for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_reset_code(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO password_reset_codes (user_id, code) VALUES ($1, $2)")
            .bind(user_id)
            .bind(code)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Whether the user has this code and it is less than an hour old.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_valid_reset_code(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<bool, RepositoryError> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM password_reset_codes
             WHERE user_id = $1 AND code = $2 AND created_at > now() - INTERVAL '1 hour'
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Remove all reset codes for a user (after a successful reset).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_reset_codes(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM password_reset_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
