//! Marker domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. `Marker` serializes directly into API responses; every field on it
//! is owner-visible and viewer-visible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waymark_core::{Coordinates, Description, Email, LocationName, MarkerId, Patch};

/// A map marker (domain type).
///
/// Coordinates are always the geocoder's output for `location_name`; clients
/// never supply them.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// Store-assigned marker ID.
    pub id: MarkerId,
    /// Email of the user whose map this marker belongs to.
    pub owner_email: Email,
    /// The place name the owner typed.
    pub location_name: LocationName,
    /// Geocoded position; serialized as top-level `latitude`/`longitude`.
    #[serde(flatten)]
    pub coordinates: Coordinates,
    /// Durable image URL (Cloudinary or an external URL the owner supplied).
    pub image_url: Option<String>,
    /// Optional free-text notes.
    pub description: Option<Description>,
    /// When the marker was created. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Marker {
    /// Whether `actor` owns this marker and may mutate or delete it.
    #[must_use]
    pub fn is_owned_by(&self, actor: &Email) -> bool {
        self.owner_email == *actor
    }
}

/// Fields for a marker about to be inserted.
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub owner_email: Email,
    pub location_name: LocationName,
    pub coordinates: Coordinates,
    pub description: Option<Description>,
    pub image_url: Option<String>,
}

/// Tagged field set for a partial marker update.
///
/// Fields missing from the request body deserialize to [`Patch::Omitted`]
/// and are left untouched. `description` is clearable: an explicit `null`
/// removes it, while omission keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkerUpdate {
    /// New place name; triggers re-geocoding when set.
    #[serde(default)]
    pub location_name: Patch<String>,
    /// New description, or `null` to clear it.
    #[serde(default)]
    pub description: Patch<Option<String>>,
}

impl MarkerUpdate {
    /// Whether the update carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.location_name.is_omitted() && self.description.is_omitted()
    }
}

/// A user's public map: profile header plus their markers.
#[derive(Debug, Clone, Serialize)]
pub struct UserMap {
    pub user_email: Email,
    pub user_name: String,
    pub markers: Vec<Marker>,
}
