//! Google OAuth 2.0 client.
//!
//! Handles the authorization-code flow for Google sign-in. Identity
//! comes from the OpenID Connect userinfo endpoint rather than from
//! decoding the ID token, so no local JWT verification is needed.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the user to Google's consent page
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Fetch the user's profile with `fetch_userinfo()`

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleAuthConfig;

/// Google OAuth 2.0 authorization endpoint.
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth 2.0 token endpoint.
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OpenID Connect userinfo endpoint.
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors that can occur during the Google OAuth flow.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OAuth flow failed.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// Client for Google's OAuth 2.0 endpoints.
#[derive(Clone)]
pub struct GoogleAuthClient {
    inner: Arc<GoogleAuthClientInner>,
}

struct GoogleAuthClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleAuthClient {
    /// Create a new Google OAuth client.
    #[must_use]
    pub fn new(config: &GoogleAuthConfig) -> Self {
        Self {
            inner: Arc::new(GoogleAuthClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: config.redirect_uri.clone(),
            }),
        }
    }

    /// Get the OAuth client ID (safe to expose in frontend).
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Generate the authorization URL for Google sign-in.
    ///
    /// Redirect users to this URL to begin the OAuth flow.
    ///
    /// # Arguments
    ///
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTH_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for access tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, GoogleAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::OAuth(format!(
                "Token exchange failed: {text}"
            )));
        }

        let tokens: GoogleTokens = response.json().await?;

        Ok(tokens)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Arguments
    ///
    /// * `access_token` - The access token from a completed code exchange
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails.
    pub async fn fetch_userinfo(
        &self,
        access_token: &str,
    ) -> Result<GoogleUserInfo, GoogleAuthError> {
        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::OAuth(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        let userinfo: GoogleUserInfo = response.json().await?;

        Ok(userinfo)
    }
}

/// Tokens returned from the authorization code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    /// Bearer token for Google API calls.
    pub access_token: String,
    /// Seconds until the access token expires.
    pub expires_in: Option<i64>,
    /// OpenID Connect ID token, unused here.
    pub id_token: Option<String>,
}

/// Profile claims from the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    /// Stable Google account identifier.
    pub sub: String,
    /// Account email address.
    pub email: String,
    /// Whether Google has verified the email.
    #[serde(default)]
    pub email_verified: bool,
    /// Display name, absent for some accounts.
    pub name: Option<String>,
    /// Avatar URL.
    pub picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use secrecy::SecretString;

    fn test_client() -> GoogleAuthClient {
        GoogleAuthClient::new(&GoogleAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("oauth-secret"),
            redirect_uri: "https://waymark.example.com/auth/google/callback".to_string(),
        })
    }

    #[test]
    fn test_authorization_url_contains_parameters() {
        let url = test_client().authorization_url("state-abc");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=state-abc"));
    }

    #[test]
    fn test_authorization_url_encodes_redirect_uri() {
        let url = test_client().authorization_url("s");

        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fwaymark.example.com%2Fauth%2Fgoogle%2Fcallback"
        ));
    }

    #[test]
    fn test_userinfo_deserializes_full_profile() {
        let json = r#"{
            "sub": "110248495921238986420",
            "email": "ada@example.com",
            "email_verified": true,
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "picture": "https://lh3.googleusercontent.com/a/photo.jpg"
        }"#;

        let userinfo: GoogleUserInfo = serde_json::from_str(json).unwrap();

        assert_eq!(userinfo.sub, "110248495921238986420");
        assert_eq!(userinfo.email, "ada@example.com");
        assert!(userinfo.email_verified);
        assert_eq!(userinfo.name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_userinfo_tolerates_sparse_profile() {
        let json = r#"{"sub": "42", "email": "x@example.com"}"#;

        let userinfo: GoogleUserInfo = serde_json::from_str(json).unwrap();

        assert!(!userinfo.email_verified);
        assert!(userinfo.name.is_none());
        assert!(userinfo.picture.is_none());
    }

    #[test]
    fn test_tokens_deserialize_from_google_response() {
        let json = r#"{
            "access_token": "ya29.a0AfH6SMBx",
            "expires_in": 3599,
            "scope": "openid email profile",
            "token_type": "Bearer",
            "id_token": "eyJhbGciOiJSUzI1NiJ9.e30.sig"
        }"#;

        let tokens: GoogleTokens = serde_json::from_str(json).unwrap();

        assert_eq!(tokens.access_token, "ya29.a0AfH6SMBx");
        assert_eq!(tokens.expires_in, Some(3599));
        assert!(tokens.id_token.is_some());
    }
}
