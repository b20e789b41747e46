//! Marker repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::{Coordinates, Description, Email, LocationName, MarkerId};

use super::RepositoryError;
use crate::models::{Marker, NewMarker};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` marker queries.
#[derive(Debug, sqlx::FromRow)]
struct MarkerRow {
    id: Uuid,
    owner_email: String,
    location_name: String,
    latitude: f64,
    longitude: f64,
    image_url: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MarkerRow> for Marker {
    type Error = RepositoryError;

    fn try_from(row: MarkerRow) -> Result<Self, Self::Error> {
        let owner_email = Email::parse(&row.owner_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid owner email in database: {e}"))
        })?;

        let location_name = LocationName::parse(&row.location_name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid location name in database: {e}"))
        })?;

        let coordinates = Coordinates::new(row.latitude, row.longitude).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid coordinates in database: {e}"))
        })?;

        let description = row
            .description
            .as_deref()
            .map(Description::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid description in database: {e}"))
            })?;

        Ok(Self {
            id: MarkerId::from_uuid(row.id),
            owner_email,
            location_name,
            coordinates,
            image_url: row.image_url,
            description,
            created_at: row.created_at,
        })
    }
}

const MARKER_COLUMNS: &str =
    "id, owner_email, location_name, latitude, longitude, image_url, description, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for marker database operations.
pub struct MarkerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MarkerRepository<'a> {
    /// Create a new marker repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new marker and return it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn insert(&self, new: &NewMarker) -> Result<Marker, RepositoryError> {
        let row = sqlx::query_as::<_, MarkerRow>(&format!(
            "INSERT INTO marker (owner_email, location_name, latitude, longitude, image_url, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {MARKER_COLUMNS}"
        ))
        .bind(new.owner_email.as_str())
        .bind(new.location_name.as_str())
        .bind(new.coordinates.latitude)
        .bind(new.coordinates.longitude)
        .bind(new.image_url.as_deref())
        .bind(new.description.as_ref().map(Description::as_str))
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// List a user's markers in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_by_owner(&self, owner: &Email) -> Result<Vec<Marker>, RepositoryError> {
        let rows = sqlx::query_as::<_, MarkerRow>(&format!(
            "SELECT {MARKER_COLUMNS} FROM marker WHERE owner_email = $1 ORDER BY created_at ASC"
        ))
        .bind(owner.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a marker by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: MarkerId) -> Result<Option<Marker>, RepositoryError> {
        let row = sqlx::query_as::<_, MarkerRow>(&format!(
            "SELECT {MARKER_COLUMNS} FROM marker WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Write a marker's mutable fields back to the store.
    ///
    /// Owner and creation timestamp are immutable and not part of the
    /// update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the marker no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn update(&self, marker: &Marker) -> Result<Marker, RepositoryError> {
        let row = sqlx::query_as::<_, MarkerRow>(&format!(
            "UPDATE marker
             SET location_name = $1, latitude = $2, longitude = $3, image_url = $4, description = $5
             WHERE id = $6
             RETURNING {MARKER_COLUMNS}"
        ))
        .bind(marker.location_name.as_str())
        .bind(marker.coordinates.latitude)
        .bind(marker.coordinates.longitude)
        .bind(marker.image_url.as_deref())
        .bind(marker.description.as_ref().map(Description::as_str))
        .bind(marker.id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a marker by its ID.
    ///
    /// # Returns
    ///
    /// Returns `true` if the marker was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: MarkerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM marker WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
