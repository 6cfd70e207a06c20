//! JWT issuance and verification.
//!
//! Bearer tokens for the SPA: a short-lived access token and a long-lived
//! refresh token, both HS256. Claims carry the user id, email, and admin
//! flag so the middleware can short-circuit obviously stale tokens, but
//! the user is always re-loaded from the database per request.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;

/// Access token lifetime: one hour.
const ACCESS_TTL_SECS: i64 = 3600;

/// Refresh token lifetime: seven days.
const REFRESH_TTL_SECS: i64 = 7 * 24 * 3600;

/// Which of the two token kinds a set of claims belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// An access/refresh token pair, serialized straight into responses.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Errors that can occur when verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token expired.
    #[error("token has expired")]
    Expired,

    /// Token is malformed, has a bad signature, or bad claims.
    #[error("invalid token")]
    Invalid,

    /// A refresh token was presented where an access token was expected,
    /// or vice versa.
    #[error("wrong token type")]
    WrongKind,

    /// Signing failed (should not happen with a valid key).
    #[error("failed to sign token")]
    Signing,
}

/// Issues and verifies the API's bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue an access/refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access = self.encode(user, now, now + ACCESS_TTL_SECS, TokenKind::Access)?;
        let refresh = self.encode(user, now, now + REFRESH_TTL_SECS, TokenKind::Refresh)?;

        Ok(TokenPair { access, refresh })
    }

    fn encode(
        &self,
        user: &User,
        iat: i64,
        exp: i64,
        kind: TokenKind,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user.id.as_i32(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
            iat,
            exp,
            kind,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token and check it is of the expected kind.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens,
    /// `TokenError::WrongKind` for kind mismatches, and
    /// `TokenError::Invalid` for anything else.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bluefin_core::{Email, UserId};

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("0Zp7mKq2Xv9Rt4Ws6Yb8Nd1Fg3Hj5Lc7"))
    }

    fn sample_user(is_admin: bool) -> User {
        User {
            id: UserId::new(17),
            email: Email::parse("angler@example.com").unwrap(),
            first_name: "Ava".to_string(),
            last_name: "Brook".to_string(),
            password_hash: None,
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            zip_code: String::new(),
            country: String::new(),
            google_id: None,
            auth_provider: "email".to_string(),
            avatar: None,
            points: 12,
            is_admin,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_roundtrip_access_token() {
        let svc = service();
        let pair = svc.issue_pair(&sample_user(true)).unwrap();

        let claims = svc.verify(&pair.access, TokenKind::Access).unwrap();
        assert_eq!(claims.user_id, 17);
        assert_eq!(claims.email, "angler@example.com");
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service();
        let pair = svc.issue_pair(&sample_user(false)).unwrap();

        assert!(matches!(
            svc.verify(&pair.refresh, TokenKind::Access),
            Err(TokenError::WrongKind)
        ));
        assert!(svc.verify(&pair.refresh, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let user = sample_user(false);
        let now = Utc::now().timestamp();
        // Issued two hours ago, expired one hour ago (beyond default leeway)
        let token = svc
            .encode(&user, now - 7200, now - 3600, TokenKind::Access)
            .unwrap();

        assert!(matches!(
            svc.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let svc = service();
        let other = TokenService::new(&SecretString::from("Qw8Er5Ty2Ui9Op6As3Df0Gh7Jk4Lz1Xc"));
        let pair = other.issue_pair(&sample_user(false)).unwrap();

        assert!(matches!(
            svc.verify(&pair.access, TokenKind::Access),
            Err(TokenError::Invalid)
        ));
    }
}
