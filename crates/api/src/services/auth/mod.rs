//! Authentication service.
//!
//! Password registration and login, Google sign-in account resolution,
//! and the password-reset code flow.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;
use sqlx::PgPool;

use bluefin_core::Email;

use crate::db::RepositoryError;
use crate::db::users::{CreateGoogleUser, CreateUser, UserRepository};
use crate::models::User;
use crate::services::google::GoogleProfile;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Parameters for registering a password-based account.
pub struct RegisterParams<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub city: &'a str,
}

/// Authentication service.
///
/// Handles registration, login, Google sign-in, and password resets.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, params: RegisterParams<'_>) -> Result<User, AuthError> {
        let email = Email::parse(params.email)?;
        validate_password(params.password)?;

        let password_hash = hash_password(params.password)?;

        let user = self
            .users
            .create(CreateUser {
                email: &email,
                first_name: params.first_name,
                last_name: params.last_name,
                password_hash: &password_hash,
                phone: params.phone,
                address: params.address,
                city: params.city,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` for deactivated accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Google-only accounts have no password to check against
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.users.touch_last_login(user.id).await?;

        Ok(user)
    }

    // =========================================================================
    // Google Sign-In
    // =========================================================================

    /// Resolve a verified Google profile to a local account.
    ///
    /// Lookup order: by linked Google id, then by email (linking the Google
    /// id to the existing account), then a fresh account with no password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if Google reported a malformed email.
    /// Returns `AuthError::AccountDisabled` for deactivated accounts.
    pub async fn login_with_google(&self, profile: &GoogleProfile) -> Result<User, AuthError> {
        let email = Email::parse(&profile.email)?;

        let user = if let Some(user) = self.users.get_by_google_id(&profile.sub).await? {
            user
        } else if let Some(existing) = self.users.get_by_email(&email).await? {
            self.users
                .link_google(existing.id, &profile.sub, profile.picture.as_deref())
                .await?
        } else {
            self.users
                .create_google(CreateGoogleUser {
                    email: &email,
                    first_name: profile.given_name.as_deref().unwrap_or(""),
                    last_name: profile.family_name.as_deref().unwrap_or(""),
                    google_id: &profile.sub,
                    avatar: profile.picture.as_deref(),
                })
                .await?
        };

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        self.users.touch_last_login(user.id).await?;

        Ok(user)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Start a password reset: generate and store a 6-digit code.
    ///
    /// Returns `None` when no account matches, so the route can answer 200
    /// either way and avoid account enumeration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn start_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let code = generate_reset_code();
        self.users.insert_reset_code(user.id, &code).await?;

        Ok(Some((user, code)))
    }

    /// Check a reset code without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetCode` if the code is wrong or expired.
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidResetCode)?;

        if !self.users.has_valid_reset_code(user.id, code).await? {
            return Err(AuthError::InvalidResetCode);
        }

        Ok(())
    }

    /// Complete a password reset: verify the code, set the new password,
    /// and consume the user's outstanding codes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetCode` if the code is wrong or expired.
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        validate_password(new_password)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidResetCode)?;

        if !self.users.has_valid_reset_code(user.id, code).await? {
            return Err(AuthError::InvalidResetCode);
        }

        let password_hash = hash_password(new_password)?;
        self.users.set_password(user.id, &password_hash).await?;
        self.users.delete_reset_codes(user.id).await?;

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a zero-padded 6-digit reset code.
fn generate_reset_code() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:06}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2plus").unwrap();
        assert!(verify_password("hunter2plus", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longer").is_ok());
    }

    #[test]
    fn test_reset_code_shape() {
        for _ in 0..32 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
