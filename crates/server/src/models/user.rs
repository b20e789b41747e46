//! User domain types.
//!
//! Users sign in with Google OAuth; there are no local passwords. The email
//! address doubles as the public map key (`/markers/user/{email}`).

use chrono::{DateTime, Utc};

use waymark_core::{Email, UserId};

/// A Waymark user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address, unique across users.
    pub email: Email,
    /// Display name from the OAuth profile.
    pub name: String,
    /// Avatar URL from the OAuth profile, if any.
    pub picture: Option<String>,
    /// OAuth provider that authenticated this user (currently always "google").
    pub oauth_provider: String,
    /// Stable subject identifier from the provider.
    pub oauth_id: String,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
    /// When the user last signed in.
    pub last_login: DateTime<Utc>,
}
