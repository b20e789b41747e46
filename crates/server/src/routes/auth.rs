//! Google OAuth route handlers.
//!
//! Handles the sign-in flow for Google accounts:
//! - Login: Redirects to Google's consent page
//! - Callback: Exchanges the code, upserts the user record and
//!   stores the identity in the session
//! - Me: Returns the logged-in user's profile
//! - Logout: Clears the session
//!
//! The callback is only ever hit by a browser mid-redirect, so its
//! failures redirect back to the frontend login page with an error
//! code instead of returning JSON.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use waymark_core::{Email, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Redirect to the frontend login page with an error code.
fn login_error_redirect(frontend_url: &str, code: &str) -> Redirect {
    Redirect::to(&format!("{frontend_url}/login?error={code}"))
}

/// Initiate Google OAuth login.
///
/// Generates a CSRF state parameter, stores it in the session and
/// redirects to Google's consent page.
///
/// # Route
///
/// `GET /auth/login/google`
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return login_error_redirect(&state.config().frontend_url, "session").into_response();
    }

    let auth_url = state.google().authorization_url(&oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code,
/// fetches the user's profile, upserts the local user record and
/// stores the identity in the session.
///
/// # Route
///
/// `GET /auth/google/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let frontend = state.config().frontend_url.clone();

    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return login_error_redirect(&frontend, "denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return login_error_redirect(&frontend, "missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return login_error_redirect(&frontend, "missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return login_error_redirect(&frontend, "invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Exchange code for tokens
    let tokens = match state.google().exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to exchange Google OAuth code: {}", e);
            return login_error_redirect(&frontend, "token_exchange").into_response();
        }
    };

    // Fetch the user's profile
    let userinfo = match state.google().fetch_userinfo(&tokens.access_token).await {
        Ok(userinfo) => userinfo,
        Err(e) => {
            tracing::error!("Failed to fetch Google userinfo: {}", e);
            return login_error_redirect(&frontend, "userinfo").into_response();
        }
    };

    if !userinfo.email_verified {
        tracing::warn!("Google account email not verified: {}", userinfo.email);
        return login_error_redirect(&frontend, "unverified_email").into_response();
    }

    let email = match Email::parse(&userinfo.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Google returned an unusable email: {}", e);
            return login_error_redirect(&frontend, "invalid_email").into_response();
        }
    };

    let name = userinfo
        .name
        .unwrap_or_else(|| email.local_part().to_string());

    // Create or refresh the local account
    let users = UserRepository::new(state.pool());
    let user = match users
        .upsert_oauth_user(
            &email,
            &name,
            userinfo.picture.as_deref(),
            "google",
            &userinfo.sub,
        )
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to upsert user after OAuth login: {}", e);
            return login_error_redirect(&frontend, "account").into_response();
        }
    };

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        oauth_id: user.oauth_id.clone(),
    };

    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to store user in session: {}", e);
        return login_error_redirect(&frontend, "session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!("User {} authenticated via Google", user.email);

    Redirect::to(&frontend).into_response()
}

/// Response body for the current-user endpoint.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User's database ID.
    pub id: UserId,
    /// Account email address.
    pub email: String,
    /// Display name from the OAuth profile.
    pub name: String,
    /// Avatar URL, if the profile has one.
    pub picture: Option<String>,
}

/// Return the logged-in user's profile.
///
/// The profile is loaded fresh from the database so a deleted
/// account invalidates the session immediately.
///
/// # Route
///
/// `GET /auth/me`
///
/// # Errors
///
/// Returns 401 if nobody is logged in or the account no longer exists.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserResponse>> {
    let users = UserRepository::new(state.pool());

    let user = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email.to_string(),
        name: user.name,
        picture: user.picture,
    }))
}

/// Log out and clear the session.
///
/// # Route
///
/// `POST /auth/logout`
///
/// # Errors
///
/// Returns 500 if the session cannot be cleared.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string_length() {
        assert_eq!(generate_random_string(32).len(), 32);
        assert_eq!(generate_random_string(0).len(), 0);
    }

    #[test]
    fn test_generate_random_string_is_alphanumeric() {
        let s = generate_random_string(64);
        assert!(s.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn test_generate_random_string_varies() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }

    #[test]
    fn test_callback_query_tolerates_missing_fields() {
        let query: CallbackQuery = serde_json::from_str("{}").unwrap();

        assert!(query.code.is_none());
        assert!(query.state.is_none());
        assert!(query.error.is_none());
    }
}
