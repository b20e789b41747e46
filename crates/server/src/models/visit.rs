//! Visit domain types.
//!
//! A visit records that one user viewed another's map. Visits are append-only:
//! nothing in the system mutates or deletes them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use waymark_core::{Email, VisitId};

/// A logged map view (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Visit {
    /// Store-assigned visit ID.
    pub id: VisitId,
    /// Whose map was viewed.
    pub visited_user_email: Email,
    /// Who viewed it. Never equal to `visited_user_email`.
    pub visitor_email: Email,
    /// OAuth subject of the visitor's account at the time of the visit.
    pub visitor_oauth_id: String,
    /// When the visit happened. Immutable.
    pub visited_at: DateTime<Utc>,
}

/// Fields for a visit about to be recorded.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub visited_user_email: Email,
    pub visitor_email: Email,
    pub visitor_oauth_id: String,
}
