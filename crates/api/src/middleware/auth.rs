//! Authentication extractors.
//!
//! Handlers declare what they need: [`RequireUser`] for any logged-in
//! customer, [`RequireAdmin`] for staff, [`OptionalUser`] where guests are
//! welcome. Each extractor verifies the `Authorization: Bearer` access
//! token and re-loads the account, so deactivated or deleted users are
//! rejected even with a valid token.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use bluefin_core::UserId;

use crate::db::users::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::tokens::TokenKind;
use crate::state::AppState;

/// Extractor that requires a logged-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireUser`, a missing `Authorization` header is not an error.
/// A header that is present but invalid still rejects the request.
pub struct OptionalUser(pub Option<User>);

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state)
            .await?
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state).await?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = authenticate(parts, &state)
            .await?
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        if !user.is_admin {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Resolve the bearer token on the request to a live account.
///
/// Returns `Ok(None)` when no `Authorization` header is present.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid authorization header".to_owned()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("token prefix must be Bearer".to_owned()))?;

    let claims = state.tokens().verify(token, TokenKind::Access)?;

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(UserId::new(claims.user_id))
        .await?
        .ok_or_else(|| AppError::Unauthorized("user not found".to_owned()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("user is inactive".to_owned()));
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Some(user))
}
