//! Visit repository for database operations.
//!
//! The visit log is append-only; there are no update or delete operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::{Email, VisitId};

use super::RepositoryError;
use crate::models::{NewVisit, Visit};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` visit queries.
#[derive(Debug, sqlx::FromRow)]
struct VisitRow {
    id: Uuid,
    visited_user_email: String,
    visitor_email: String,
    visitor_oauth_id: String,
    visited_at: DateTime<Utc>,
}

impl TryFrom<VisitRow> for Visit {
    type Error = RepositoryError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        let visited_user_email = Email::parse(&row.visited_user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid visited email in database: {e}"))
        })?;

        let visitor_email = Email::parse(&row.visitor_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid visitor email in database: {e}"))
        })?;

        Ok(Self {
            id: VisitId::from_uuid(row.id),
            visited_user_email,
            visitor_email,
            visitor_oauth_id: row.visitor_oauth_id,
            visited_at: row.visited_at,
        })
    }
}

const VISIT_COLUMNS: &str = "id, visited_user_email, visitor_email, visitor_oauth_id, visited_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for visit database operations.
pub struct VisitRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitRepository<'a> {
    /// Create a new visit repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a visit to the log and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn insert(&self, new: &NewVisit) -> Result<Visit, RepositoryError> {
        let row = sqlx::query_as::<_, VisitRow>(&format!(
            "INSERT INTO visit (visited_user_email, visitor_email, visitor_oauth_id)
             VALUES ($1, $2, $3)
             RETURNING {VISIT_COLUMNS}"
        ))
        .bind(new.visited_user_email.as_str())
        .bind(new.visitor_email.as_str())
        .bind(new.visitor_oauth_id.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// List visits received by a user, newest first, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_received(
        &self,
        visited_user: &Email,
        limit: i64,
    ) -> Result<Vec<Visit>, RepositoryError> {
        let rows = sqlx::query_as::<_, VisitRow>(&format!(
            "SELECT {VISIT_COLUMNS} FROM visit
             WHERE visited_user_email = $1
             ORDER BY visited_at DESC
             LIMIT $2"
        ))
        .bind(visited_user.as_str())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
