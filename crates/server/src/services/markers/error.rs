//! Marker service error types.

use thiserror::Error;

use waymark_core::{DescriptionError, LocationNameError};

use crate::cloudinary::CloudinaryError;
use crate::db::RepositoryError;
use crate::geocoding::GeocodingError;

/// Errors that can occur during marker operations.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// Invalid location name.
    #[error("invalid location name: {0}")]
    InvalidLocationName(#[from] LocationNameError),

    /// Invalid description.
    #[error("invalid description: {0}")]
    InvalidDescription(#[from] DescriptionError),

    /// Image input is not usable.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Geocoder had no match for the location name.
    #[error("no coordinates found for: {0}")]
    LocationNotFound(String),

    /// Marker missing or owned by someone else. The two cases are
    /// deliberately not distinguished.
    #[error("marker not found or not authorized")]
    MarkerNotFound,

    /// Target user does not exist.
    #[error("no user found with email: {0}")]
    UserNotFound(String),

    /// Geocoding request failed.
    #[error("geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    /// Image upload failed.
    #[error("image upload error: {0}")]
    Upload(#[from] CloudinaryError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
