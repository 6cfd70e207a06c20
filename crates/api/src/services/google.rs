//! Google ID token verification.
//!
//! The SPA obtains an ID token from Google Identity Services and posts it
//! to us; we verify it against Google's tokeninfo endpoint and check the
//! audience matches our OAuth client id.

use serde::Deserialize;
use thiserror::Error;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Errors that can occur while verifying a Google ID token.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Request to Google failed.
    #[error("tokeninfo request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Google did not accept the token.
    #[error("google rejected the id token")]
    Rejected,

    /// Token was issued for a different OAuth client.
    #[error("id token audience mismatch")]
    AudienceMismatch,
}

/// The subset of the tokeninfo payload we use.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google's stable account id.
    pub sub: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    aud: String,
}

/// Verifies Google ID tokens for sign-in.
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    /// Create a verifier for the configured OAuth client id.
    #[must_use]
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }

    /// Verify an ID token and return the Google profile it asserts.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError::Rejected` if Google does not accept the token,
    /// `GoogleError::AudienceMismatch` if it was issued for another client,
    /// and `GoogleError::Http` for transport failures.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, GoogleError> {
        // ID tokens are base64url + dots, so no query encoding is needed
        let response = self
            .http
            .get(format!("{TOKENINFO_URL}?id_token={id_token}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleError::Rejected);
        }

        let profile: GoogleProfile = response.json().await?;

        if profile.aud != self.client_id {
            tracing::warn!("google id token issued for foreign audience");
            return Err(GoogleError::AudienceMismatch);
        }

        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_tokeninfo_payload() {
        let json = r#"{
            "aud": "1234.apps.googleusercontent.com",
            "sub": "110169484474386276334",
            "email": "angler@example.com",
            "email_verified": "true",
            "given_name": "Ava",
            "family_name": "Brook",
            "picture": "https://lh3.googleusercontent.com/a/photo.jpg",
            "exp": "1715000000"
        }"#;

        let profile: GoogleProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sub, "110169484474386276334");
        assert_eq!(profile.email, "angler@example.com");
        assert_eq!(profile.given_name.as_deref(), Some("Ava"));
        assert_eq!(profile.aud, "1234.apps.googleusercontent.com");
    }
}
