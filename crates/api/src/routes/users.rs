//! Account route handlers: registration, login, Google sign-in, token
//! refresh, profile, and password reset.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use bluefin_core::UserId;

use crate::db::users::{UpdateProfile, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::auth::{AuthService, RegisterParams};
use crate::services::tokens::{TokenKind, TokenPair};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
}

impl RegisterRequest {
    /// Fields the storefront registration form must fill in.
    fn required_fields(&self) -> [(&String, &'static str); 5] {
        [
            (&self.first_name, "first_name"),
            (&self.last_name, "last_name"),
            (&self.phone, "phone"),
            (&self.address, "address"),
            (&self.city, "city"),
        ]
    }
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Google sign-in payload: the ID token from Google Identity Services.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Token refresh payload.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Partial profile update payload.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Forgot-password payload.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-code verification payload.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Password reset payload.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
    pub avatar: Option<String>,
    pub points: i32,
    pub is_admin: bool,
}

impl ProfileResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            city: user.city.clone(),
            zip_code: user.zip_code.clone(),
            country: user.country.clone(),
            avatar: user.avatar.clone(),
            points: user.points,
            is_admin: user.is_admin,
        }
    }
}

/// Login/registration response: profile plus token pair.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: ProfileResponse,
    pub tokens: TokenPair,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account and log it in.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    for (value, field) in req.required_fields() {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "The {field} field is required"
            )));
        }
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .register(RegisterParams {
            email: &req.email,
            password: &req.password,
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            phone: req.phone.trim(),
            address: req.address.trim(),
            city: req.city.trim(),
        })
        .await?;

    let tokens = state.tokens().issue_pair(&user)?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: ProfileResponse::from_user(&user),
            tokens,
        }),
    ))
}

/// Login with email and password.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&req.email, &req.password).await?;

    let tokens = state.tokens().issue_pair(&user)?;

    Ok(Json(AuthResponse {
        user: ProfileResponse::from_user(&user),
        tokens,
    }))
}

/// Login (or sign up) with a Google ID token.
pub async fn google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>> {
    let verifier = state
        .google()
        .ok_or_else(|| AppError::BadRequest("Google sign-in is not configured".to_owned()))?;

    let profile = verifier.verify(&req.token).await?;

    let auth = AuthService::new(state.pool());
    let user = auth.login_with_google(&profile).await?;

    let tokens = state.tokens().issue_pair(&user)?;
    tracing::info!(user_id = %user.id, "google sign-in");

    Ok(Json(AuthResponse {
        user: ProfileResponse::from_user(&user),
        tokens,
    }))
}

/// Exchange a refresh token for a fresh token pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>> {
    let claims = state.tokens().verify(&req.refresh, TokenKind::Refresh)?;

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(UserId::new(claims.user_id))
        .await?
        .ok_or_else(|| AppError::Unauthorized("user not found".to_owned()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("user is inactive".to_owned()));
    }

    let tokens = state.tokens().issue_pair(&user)?;

    Ok(Json(json!({ "tokens": tokens })))
}

/// Current user's profile.
pub async fn profile(RequireUser(user): RequireUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_user(&user))
}

/// Partial update of the current user's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let users = UserRepository::new(state.pool());
    let updated = users
        .update_profile(
            user.id,
            &UpdateProfile {
                first_name: req.first_name,
                last_name: req.last_name,
                phone: req.phone,
                address: req.address,
                city: req.city,
                zip_code: req.zip_code,
                country: req.country,
            },
        )
        .await?;

    Ok(Json(ProfileResponse::from_user(&updated)))
}

/// Start a password reset.
///
/// Responds 200 whether or not the account exists, so the endpoint cannot
/// be used to probe for registered emails.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let auth = AuthService::new(state.pool());

    if let Some((user, code)) = auth.start_password_reset(&req.email).await? {
        state.mailer().send_reset_code(&user.email, &code).await?;
    }

    Ok(Json(json!({
        "message": "If the account exists, a reset code has been sent"
    })))
}

/// Check a reset code without consuming it.
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<serde_json::Value>> {
    let auth = AuthService::new(state.pool());
    auth.verify_reset_code(&req.email, &req.code).await?;

    Ok(Json(json!({ "message": "Code is valid" })))
}

/// Complete a password reset.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    let auth = AuthService::new(state.pool());
    auth.reset_password(&req.email, &req.code, &req.password)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}
