//! Marker service.
//!
//! Orchestrates geocoding, image upload and persistence for the
//! marker lifecycle. Coordinates are always the result of geocoding
//! the location name; callers never supply them.

mod error;

pub use error::MarkerError;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sqlx::PgPool;

use waymark_core::{Coordinates, Description, Email, LocationName, MarkerId, Patch};

use crate::cloudinary::CloudinaryClient;
use crate::db::markers::MarkerRepository;
use crate::db::users::UserRepository;
use crate::geocoding::GeocodingClient;
use crate::models::{CurrentUser, Marker, MarkerUpdate, NewMarker, UserMap};
use crate::services::visits::VisitService;

/// Prefix identifying an inline image payload.
const DATA_URI_PREFIX: &str = "data:image";

/// Marker service.
///
/// Owns the create/read/update/delete workflows for markers,
/// including the ownership checks.
pub struct MarkerService<'a> {
    markers: MarkerRepository<'a>,
    users: UserRepository<'a>,
    visits: VisitService<'a>,
    geocoder: &'a GeocodingClient,
    images: &'a CloudinaryClient,
}

impl<'a> MarkerService<'a> {
    /// Create a new marker service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        geocoder: &'a GeocodingClient,
        images: &'a CloudinaryClient,
    ) -> Self {
        Self {
            markers: MarkerRepository::new(pool),
            users: UserRepository::new(pool),
            visits: VisitService::new(pool),
            geocoder,
            images,
        }
    }

    // =========================================================================
    // Create / List
    // =========================================================================

    /// Create a marker on the owner's map.
    ///
    /// The location name is geocoded first; a marker is never
    /// persisted without resolved coordinates. A base64 data URI
    /// image is uploaded to the image store and replaced with the
    /// hosted URL; an image that is already a URL passes through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::InvalidLocationName` or
    /// `MarkerError::InvalidDescription` if a field fails validation.
    /// Returns `MarkerError::LocationNotFound` if the name doesn't geocode.
    /// Returns `MarkerError::InvalidImage` or `MarkerError::Upload` if
    /// the image can't be stored.
    pub async fn create(
        &self,
        owner: &Email,
        location_name: &str,
        description: Option<&str>,
        image: Option<&str>,
    ) -> Result<Marker, MarkerError> {
        let location_name = LocationName::parse(location_name)?;
        let description = description.map(Description::parse).transpose()?;

        let coordinates = self.resolve_coordinates(&location_name).await?;

        let image_url = match image {
            Some(input) => Some(self.resolve_image(input).await?),
            None => None,
        };

        let marker = self
            .markers
            .insert(&NewMarker {
                owner_email: owner.clone(),
                location_name,
                coordinates,
                description,
                image_url,
            })
            .await?;

        Ok(marker)
    }

    /// List the owner's markers in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::Repository` if the query fails.
    pub async fn list_for_owner(&self, owner: &Email) -> Result<Vec<Marker>, MarkerError> {
        let markers = self.markers.list_by_owner(owner).await?;
        Ok(markers)
    }

    /// Fetch a user's map for read-only viewing.
    ///
    /// When an authenticated viewer looks at someone else's map, a
    /// visit is logged as a side effect. The read never fails on a
    /// logging failure; visit errors are swallowed and logged.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::UserNotFound` if no user has the target email.
    /// Returns `MarkerError::Repository` if the marker query fails.
    pub async fn public_map(
        &self,
        target: &Email,
        viewer: Option<&CurrentUser>,
    ) -> Result<UserMap, MarkerError> {
        let user = self
            .users
            .get_by_email(target)
            .await?
            .ok_or_else(|| MarkerError::UserNotFound(target.to_string()))?;

        // Self-visits are filtered out inside the visit service.
        if let Some(viewer) = viewer
            && let Err(e) = self
                .visits
                .record(target, &viewer.email, &viewer.oauth_id)
                .await
        {
            tracing::warn!("Failed to record visit to {}: {}", target, e);
        }

        let markers = self.markers.list_by_owner(target).await?;

        Ok(UserMap {
            user_email: user.email,
            user_name: user.name,
            markers,
        })
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Apply a partial update to a marker the actor owns.
    ///
    /// Only fields present in the update are touched. A new location
    /// name is re-geocoded before anything is written; if it doesn't
    /// resolve, the marker is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::MarkerNotFound` if the marker doesn't
    /// exist or the actor doesn't own it.
    /// Returns `MarkerError::LocationNotFound` if a new location name
    /// doesn't geocode.
    pub async fn update(
        &self,
        id: MarkerId,
        actor: &Email,
        update: MarkerUpdate,
    ) -> Result<Marker, MarkerError> {
        let mut marker = self.authorize(id, actor).await?;

        if let Patch::Set(name) = update.location_name {
            let name = LocationName::parse(&name)?;
            marker.coordinates = self.resolve_coordinates(&name).await?;
            marker.location_name = name;
        }

        match update.description {
            Patch::Set(Some(text)) => marker.description = Some(Description::parse(&text)?),
            Patch::Set(None) => marker.description = None,
            Patch::Omitted => {}
        }

        let marker = self.markers.update(&marker).await?;

        Ok(marker)
    }

    /// Replace a marker's image with freshly uploaded bytes.
    ///
    /// Ownership is checked before the upload happens.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::MarkerNotFound` if the marker doesn't
    /// exist or the actor doesn't own it.
    /// Returns `MarkerError::Upload` if the image store rejects the bytes.
    pub async fn update_image(
        &self,
        id: MarkerId,
        actor: &Email,
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Marker, MarkerError> {
        let mut marker = self.authorize(id, actor).await?;

        let url = self.images.upload_bytes(bytes, filename).await?;
        marker.image_url = Some(url);

        let marker = self.markers.update(&marker).await?;

        Ok(marker)
    }

    /// Delete a marker the actor owns.
    ///
    /// # Returns
    ///
    /// Returns `true` if the marker was deleted. A missing marker and
    /// a marker owned by someone else both come back as `false`.
    ///
    /// # Errors
    ///
    /// Returns `MarkerError::Repository` if the database operation fails.
    pub async fn delete(&self, id: MarkerId, actor: &Email) -> Result<bool, MarkerError> {
        match self.authorize(id, actor).await {
            Ok(_) => {
                let deleted = self.markers.delete(id).await?;
                Ok(deleted)
            }
            Err(MarkerError::MarkerNotFound) => Ok(false),
            Err(other) => Err(other),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Load a marker and check that the actor owns it.
    ///
    /// A missing marker and a marker owned by someone else are
    /// indistinguishable to the caller; both come back as
    /// `MarkerNotFound`.
    async fn authorize(&self, id: MarkerId, actor: &Email) -> Result<Marker, MarkerError> {
        let marker = self
            .markers
            .get_by_id(id)
            .await?
            .ok_or(MarkerError::MarkerNotFound)?;

        if !marker.is_owned_by(actor) {
            return Err(MarkerError::MarkerNotFound);
        }

        Ok(marker)
    }

    /// Geocode a location name, mapping an empty result to `LocationNotFound`.
    async fn resolve_coordinates(&self, name: &LocationName) -> Result<Coordinates, MarkerError> {
        self.geocoder
            .geocode(name)
            .await?
            .ok_or_else(|| MarkerError::LocationNotFound(name.to_string()))
    }

    /// Turn an image input into a hosted URL.
    async fn resolve_image(&self, input: &str) -> Result<String, MarkerError> {
        if !input.starts_with(DATA_URI_PREFIX) {
            return Ok(input.to_string());
        }

        validate_data_uri(input)?;

        let url = self.images.upload_data_uri(input).await?;

        Ok(url)
    }
}

/// Check that a data URI carries a decodable base64 payload.
fn validate_data_uri(input: &str) -> Result<(), MarkerError> {
    let Some((_, payload)) = input.split_once(";base64,") else {
        return Err(MarkerError::InvalidImage(
            "data URI must be base64-encoded".to_string(),
        ));
    };

    if payload.is_empty() {
        return Err(MarkerError::InvalidImage(
            "data URI payload is empty".to_string(),
        ));
    }

    STANDARD
        .decode(payload)
        .map_err(|e| MarkerError::InvalidImage(format!("invalid base64 payload: {e}")))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{CloudinaryConfig, GeocoderConfig};

    // A lazy pool and dummy clients are enough to exercise the image
    // resolution paths that never reach the network.
    fn collaborators() -> (PgPool, GeocodingClient, CloudinaryClient) {
        let pool = PgPool::connect_lazy("postgres://localhost/waymark_test").unwrap();
        let geocoder = GeocodingClient::new(&GeocoderConfig {
            base_url: "http://localhost:9".to_string(),
            user_agent: "waymark-tests".to_string(),
        })
        .unwrap();
        let images = CloudinaryClient::new(&CloudinaryConfig {
            cloud_name: "test".to_string(),
            api_key: "key".to_string(),
            api_secret: SecretString::from("secret"),
            upload_folder: "waymark".to_string(),
        });
        (pool, geocoder, images)
    }

    #[tokio::test]
    async fn test_resolve_image_passes_hosted_url_through() {
        let (pool, geocoder, images) = collaborators();
        let service = MarkerService::new(&pool, &geocoder, &images);

        let url = "https://images.example.com/photo.jpg";
        let resolved = service.resolve_image(url).await.unwrap();

        assert_eq!(resolved, url);
    }

    #[tokio::test]
    async fn test_resolve_image_rejects_bad_data_uri_before_upload() {
        let (pool, geocoder, images) = collaborators();
        let service = MarkerService::new(&pool, &geocoder, &images);

        let err = service.resolve_image("data:image/png;base64,").await.unwrap_err();

        assert!(matches!(err, MarkerError::InvalidImage(_)));
    }

    #[test]
    fn test_validate_data_uri_accepts_base64_png() {
        // Base64 of the 8-byte PNG signature
        let uri = "data:image/png;base64,iVBORw0KGgo=";
        assert!(validate_data_uri(uri).is_ok());
    }

    #[test]
    fn test_validate_data_uri_rejects_non_base64_encoding() {
        let uri = "data:image/svg+xml,<svg></svg>";
        let err = validate_data_uri(uri).unwrap_err();

        assert!(matches!(err, MarkerError::InvalidImage(_)));
    }

    #[test]
    fn test_validate_data_uri_rejects_empty_payload() {
        let uri = "data:image/png;base64,";
        let err = validate_data_uri(uri).unwrap_err();

        assert!(matches!(err, MarkerError::InvalidImage(_)));
    }

    #[test]
    fn test_validate_data_uri_rejects_invalid_base64() {
        let uri = "data:image/png;base64,not!!valid@@base64";
        let err = validate_data_uri(uri).unwrap_err();

        assert!(matches!(err, MarkerError::InvalidImage(_)));
    }
}
