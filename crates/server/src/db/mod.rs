//! Database operations for Waymark `PostgreSQL`.
//!
//! ## Tables
//!
//! - `app_user` - OAuth-backed user accounts (email is the public map key)
//! - `marker` - Map markers, keyed by owner email
//! - `visit` - Append-only log of map views
//! - `tower_sessions.session` - Session storage (tower-sessions layout)
//!
//! Queries are runtime-checked (`sqlx::query_as`/`query`) so the crate builds
//! without a reachable database; row structs plus `TryFrom` conversions keep
//! the domain types validated at the boundary.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p waymark-cli -- migrate
//! ```

pub mod markers;
pub mod users;
pub mod visits;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use markers::MarkerRepository;
pub use users::UserRepository;
pub use visits::VisitRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
