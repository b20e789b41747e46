//! Visit logging service.
//!
//! Records that one user viewed another's map and lists the visits a
//! user has received. The visit log is append-only; nothing in the
//! system mutates or deletes entries.

use sqlx::PgPool;
use thiserror::Error;

use waymark_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::db::visits::VisitRepository;
use crate::models::{NewVisit, Visit};

/// Maximum number of visits returned by a listing.
pub const LIST_LIMIT: i64 = 50;

/// Errors that can occur during visit operations.
#[derive(Debug, Error)]
pub enum VisitError {
    /// Visited user does not exist.
    #[error("no user found with email: {0}")]
    UserNotFound(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Visit logging service.
pub struct VisitService<'a> {
    users: UserRepository<'a>,
    visits: VisitRepository<'a>,
}

impl<'a> VisitService<'a> {
    /// Create a new visit service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            visits: VisitRepository::new(pool),
        }
    }

    /// Record a visit to another user's map.
    ///
    /// Self-visits are never logged and return `Ok(None)` without
    /// touching the store.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::UserNotFound` if the visited user doesn't exist.
    /// Returns `VisitError::Repository` if the write fails.
    pub async fn record(
        &self,
        visited: &Email,
        visitor: &Email,
        visitor_oauth_id: &str,
    ) -> Result<Option<Visit>, VisitError> {
        if visited == visitor {
            return Ok(None);
        }

        if self.users.get_by_email(visited).await?.is_none() {
            return Err(VisitError::UserNotFound(visited.to_string()));
        }

        let visit = self
            .visits
            .insert(&NewVisit {
                visited_user_email: visited.clone(),
                visitor_email: visitor.clone(),
                visitor_oauth_id: visitor_oauth_id.to_string(),
            })
            .await?;

        Ok(Some(visit))
    }

    /// List the most recent visits to a user's map, newest first.
    ///
    /// Capped at [`LIST_LIMIT`] entries.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::Repository` if the query fails.
    pub async fn list_received(&self, user: &Email) -> Result<Vec<Visit>, VisitError> {
        let visits = self.visits.list_received(user, LIST_LIMIT).await?;
        Ok(visits)
    }
}
