//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors
//! to Sentry before responding to the client. All route handlers
//! return `Result<T, AppError>` and respond with a JSON body of the
//! shape `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{MarkerError, VisitError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Marker operation failed.
    #[error("Marker error: {0}")]
    Marker(#[from] MarkerError),

    /// Visit operation failed.
    #[error("Visit error: {0}")]
    Visit(#[from] VisitError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body for error responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        let server_error = match &self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Marker(err) => matches!(
                err,
                MarkerError::Geocoding(_) | MarkerError::Upload(_) | MarkerError::Repository(_)
            ),
            Self::Visit(err) => matches!(err, VisitError::Repository(_)),
            _ => false,
        };

        if server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Marker(err) => match err {
                MarkerError::InvalidLocationName(_)
                | MarkerError::InvalidDescription(_)
                | MarkerError::InvalidImage(_) => StatusCode::BAD_REQUEST,
                MarkerError::LocationNotFound(_)
                | MarkerError::MarkerNotFound
                | MarkerError::UserNotFound(_) => StatusCode::NOT_FOUND,
                MarkerError::Geocoding(_) => StatusCode::BAD_GATEWAY,
                MarkerError::Upload(_) | MarkerError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Visit(err) => match err {
                VisitError::UserNotFound(_) => StatusCode::NOT_FOUND,
                VisitError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Marker(err) => match err {
                MarkerError::Geocoding(_) => "Geocoding service error".to_string(),
                MarkerError::Upload(_) => "Image upload failed".to_string(),
                MarkerError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::Visit(err) => match err {
                VisitError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of
/// actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    use waymark_core::LocationNameError;

    use crate::geocoding::GeocodingError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user@example.com".to_string());
        assert_eq!(err.to_string(), "Not found: user@example.com");

        let err = AppError::BadRequest("invalid marker id".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid marker id");
    }

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_marker_error_status_codes() {
        assert_eq!(
            get_status(AppError::Marker(MarkerError::MarkerNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Marker(MarkerError::LocationNotFound(
                "Atlantis".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Marker(MarkerError::InvalidLocationName(
                LocationNameError::Empty
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Marker(MarkerError::Geocoding(
                GeocodingError::Parse("bad json".to_string())
            ))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json_with_error_key() {
        let response =
            AppError::Marker(MarkerError::LocationNotFound("Atlantis".to_string()))
                .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body.get("error").and_then(serde_json::Value::as_str),
            Some("no coordinates found for: Atlantis")
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::Internal("connection string leak".to_string()).into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body.get("error").and_then(serde_json::Value::as_str),
            Some("Internal server error")
        );
    }
}
