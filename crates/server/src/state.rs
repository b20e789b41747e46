//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cloudinary::CloudinaryClient;
use crate::config::ServerConfig;
use crate::geocoding::{GeocodingClient, GeocodingError};
use crate::google::GoogleAuthClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the external API clients
/// and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    geocoder: GeocodingClient,
    images: CloudinaryClient,
    google: GoogleAuthClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoding client cannot be built from
    /// the configuration.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, GeocodingError> {
        let geocoder = GeocodingClient::new(&config.geocoder)?;
        let images = CloudinaryClient::new(&config.cloudinary);
        let google = GoogleAuthClient::new(&config.google);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                geocoder,
                images,
                google,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the geocoding client.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodingClient {
        &self.inner.geocoder
    }

    /// Get a reference to the image store client.
    #[must_use]
    pub fn images(&self) -> &CloudinaryClient {
        &self.inner.images
    }

    /// Get a reference to the Google OAuth client.
    #[must_use]
    pub fn google(&self) -> &GoogleAuthClient {
        &self.inner.google
    }
}
