//! Cloudinary image upload client.
//!
//! Uploads marker images to Cloudinary via the signed upload API and
//! returns the hosted HTTPS URL. Requests are signed with a SHA-256
//! digest over the sorted parameters, per Cloudinary's signed-upload
//! protocol.

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

/// Cloudinary upload API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Errors that can occur when uploading an image.
#[derive(Debug, Error)]
pub enum CloudinaryError {
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

/// Cloudinary signed-upload client.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    folder: String,
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.upload_folder.clone(),
        }
    }

    /// Upload an image given as a data URI.
    ///
    /// Cloudinary accepts data URIs directly as the `file` parameter,
    /// so the payload is forwarded as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the upload request fails.
    pub async fn upload_data_uri(&self, data_uri: &str) -> Result<String, CloudinaryError> {
        self.upload(Part::text(data_uri.to_string())).await
    }

    /// Upload raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the upload request fails.
    pub async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        filename: Option<String>,
    ) -> Result<String, CloudinaryError> {
        let part = match filename {
            Some(name) => Part::bytes(bytes).file_name(name),
            None => Part::bytes(bytes).file_name("upload"),
        };

        self.upload(part).await
    }

    /// Send a signed upload request and return the hosted URL.
    async fn upload(&self, file: Part) -> Result<String, CloudinaryError> {
        let url = format!("{BASE_URL}/{}/image/upload", self.cloud_name);
        let timestamp = Utc::now().timestamp().to_string();

        // Only folder and timestamp are part of the signature;
        // api_key, signature and signature_algorithm never are.
        let signature = sign_params(
            &[("folder", &self.folder), ("timestamp", &timestamp)],
            self.api_secret.expose_secret(),
        );

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| CloudinaryError::Parse(e.to_string()))?;

        Ok(upload.secure_url)
    }
}

/// Relevant subset of the Cloudinary upload response.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Sign upload parameters with the API secret.
///
/// Parameters are sorted by key, joined as `key=value` pairs with `&`,
/// suffixed with the secret and hashed with SHA-256.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());

    hex::encode(hasher.finalize())
}
