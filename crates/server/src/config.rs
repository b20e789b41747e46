//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WAYMARK_DATABASE_URL` - `PostgreSQL` connection string
//! - `WAYMARK_BASE_URL` - Public URL for this API (OAuth callbacks derive from it)
//! - `WAYMARK_FRONTEND_URL` - Frontend origin, used for post-login redirects and CORS
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret (placeholder/entropy checked)
//! - `CLOUDINARY_CLOUD_NAME` - Cloudinary cloud name
//! - `CLOUDINARY_API_KEY` - Cloudinary API key
//! - `CLOUDINARY_API_SECRET` - Cloudinary API secret (placeholder/entropy checked)
//!
//! ## Optional
//! - `WAYMARK_HOST` - Bind address (default: 127.0.0.1)
//! - `WAYMARK_PORT` - Listen port (default: 8000)
//! - `GOOGLE_REDIRECT_URI` - OAuth callback (default: `{base_url}/auth/google/callback`)
//! - `CLOUDINARY_UPLOAD_FOLDER` - Folder for marker images (default: waymark)
//! - `GEOCODER_BASE_URL` - Nominatim endpoint (default: <https://nominatim.openstreetmap.org>)
//! - `GEOCODER_USER_AGENT` - User-Agent sent to the geocoder (Nominatim requires one)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Waymark server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for this API
    pub base_url: String,
    /// Frontend origin (post-login redirects, CORS)
    pub frontend_url: String,
    /// Google OAuth configuration
    pub google: GoogleAuthConfig,
    /// Cloudinary image store configuration
    pub cloudinary: CloudinaryConfig,
    /// Geocoder configuration
    pub geocoder: GeocoderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Google OAuth 2.0 configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GoogleAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Callback URL registered with Google
    pub redirect_uri: String,
}

impl std::fmt::Debug for GoogleAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Cloudinary configuration for marker image uploads.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud name (appears in upload URLs)
    pub cloud_name: String,
    /// API key (sent with every upload)
    pub api_key: String,
    /// API secret (signs upload requests, never sent)
    pub api_secret: SecretString,
    /// Folder to place marker images in
    pub upload_folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("upload_folder", &self.upload_folder)
            .finish()
    }
}

/// Nominatim geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Geocoder endpoint
    pub base_url: String,
    /// User-Agent header; Nominatim's usage policy requires an identifying one
    pub user_agent: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("WAYMARK_DATABASE_URL")?;
        let host = get_env_or_default("WAYMARK_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WAYMARK_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("WAYMARK_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WAYMARK_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_url("WAYMARK_BASE_URL")?;
        let frontend_url = get_required_url("WAYMARK_FRONTEND_URL")?;

        let google = GoogleAuthConfig::from_env(&base_url)?;
        let cloudinary = CloudinaryConfig::from_env()?;
        let geocoder = GeocoderConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            frontend_url,
            google,
            cloudinary,
            geocoder,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GoogleAuthConfig {
    fn from_env(base_url: &str) -> Result<Self, ConfigError> {
        let redirect_uri = match get_optional_env("GOOGLE_REDIRECT_URI") {
            Some(uri) => uri,
            None => default_redirect_uri(base_url),
        };

        Ok(Self {
            client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
            redirect_uri,
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
            upload_folder: get_env_or_default("CLOUDINARY_UPLOAD_FOLDER", "waymark"),
        })
    }
}

impl GeocoderConfig {
    fn from_env() -> Self {
        Self {
            base_url: get_env_or_default("GEOCODER_BASE_URL", "https://nominatim.openstreetmap.org"),
            user_agent: get_env_or_default(
                "GEOCODER_USER_AGENT",
                concat!("waymark-server/", env!("CARGO_PKG_VERSION")),
            ),
        }
    }
}

/// Build the default OAuth callback from the API base URL.
fn default_redirect_uri(base_url: &str) -> String {
    format!("{}/auth/google/callback", base_url.trim_end_matches('/'))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable that must parse as an HTTP(S) URL.
/// The returned value has no trailing slash.
fn get_required_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    let parsed = url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected http(s) URL, got scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., WAYMARK_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_redirect_uri() {
        assert_eq!(
            default_redirect_uri("https://api.waymark.app"),
            "https://api.waymark.app/auth/google/callback"
        );
        // Trailing slash does not double up
        assert_eq!(
            default_redirect_uri("http://localhost:8000/"),
            "http://localhost:8000/auth/google/callback"
        );
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            google: GoogleAuthConfig {
                client_id: "client-id.apps.googleusercontent.com".to_string(),
                client_secret: SecretString::from("GOCSPX-k3J9mQ2xT7bL"),
                redirect_uri: "http://localhost:8000/auth/google/callback".to_string(),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: "demo".to_string(),
                api_key: "874837483274837".to_string(),
                api_secret: SecretString::from("b4Tz0qPmxW92aLkV"),
                upload_folder: "waymark".to_string(),
            },
            geocoder: GeocoderConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                user_agent: "waymark-server/0.1.0".to_string(),
            },
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_google_config_debug_redacts_secret() {
        let config = test_config();
        let debug_output = format!("{:?}", config.google);

        assert!(debug_output.contains("client-id.apps.googleusercontent.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("GOCSPX-k3J9mQ2xT7bL"));
    }

    #[test]
    fn test_cloudinary_config_debug_redacts_secret() {
        let config = test_config();
        let debug_output = format!("{:?}", config.cloudinary);

        assert!(debug_output.contains("demo"));
        assert!(debug_output.contains("874837483274837"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("b4Tz0qPmxW92aLkV"));
    }
}
