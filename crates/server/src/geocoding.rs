//! Nominatim geocoding client.
//!
//! Resolves free-form location names to coordinates via the Nominatim
//! search API. Only the best match is requested; an empty result set
//! means the location is unknown.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;

use waymark_core::{Coordinates, LocationName};

use crate::config::GeocoderConfig;

/// Errors that can occur when resolving a location name.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Nominatim search client.
#[derive(Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// Create a new geocoding client.
    ///
    /// Nominatim rejects requests without a User-Agent, so one is
    /// attached to every request via default headers.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodingError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| GeocodingError::Parse(format!("Invalid user agent: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolve a location name to coordinates.
    ///
    /// Returns `Ok(None)` when the geocoder has no match for the name.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response cannot
    /// be parsed.
    pub async fn geocode(
        &self,
        name: &LocationName,
    ) -> Result<Option<Coordinates>, GeocodingError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", name.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocodingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| GeocodingError::Parse(e.to_string()))?;

        parse_first_result(results)
    }
}

/// A single search hit from Nominatim.
///
/// Coordinates come back as strings in the JSON payload.
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// Extract coordinates from the first search hit, if any.
fn parse_first_result(results: Vec<SearchResult>) -> Result<Option<Coordinates>, GeocodingError> {
    let Some(first) = results.into_iter().next() else {
        return Ok(None);
    };

    let latitude: f64 = first
        .lat
        .parse()
        .map_err(|e| GeocodingError::Parse(format!("Invalid latitude '{}': {e}", first.lat)))?;
    let longitude: f64 = first
        .lon
        .parse()
        .map_err(|e| GeocodingError::Parse(format!("Invalid longitude '{}': {e}", first.lon)))?;

    let coordinates = Coordinates::new(latitude, longitude)
        .map_err(|e| GeocodingError::Parse(e.to_string()))?;

    Ok(Some(coordinates))
}
