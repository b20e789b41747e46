//! Marker route handlers.
//!
//! JSON endpoints for creating, listing, updating and deleting
//! markers, plus the read-only view of another user's map.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use waymark_core::{Email, MarkerId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Marker, MarkerUpdate, UserMap};
use crate::services::MarkerService;
use crate::state::AppState;

/// Request body for creating a marker.
#[derive(Debug, Deserialize)]
pub struct CreateMarkerRequest {
    /// Place name to geocode.
    pub location_name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional image, either a hosted URL or a base64 data URI.
    pub image_url: Option<String>,
}

/// Create a marker on the current user's map.
///
/// POST /markers
///
/// # Errors
///
/// Returns 400 on validation failures, 404 if the location doesn't
/// geocode and 500 if the image upload fails.
#[instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateMarkerRequest>,
) -> Result<(StatusCode, Json<Marker>)> {
    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());

    let marker = service
        .create(
            &user.email,
            &req.location_name,
            req.description.as_deref(),
            req.image_url.as_deref(),
        )
        .await?;

    add_breadcrumb(
        "marker",
        "Created marker",
        Some(&[("location", req.location_name.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(marker)))
}

/// List the current user's markers in insertion order.
///
/// GET /markers/my-markers
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state))]
pub async fn my_markers(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Marker>>> {
    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());
    let markers = service.list_for_owner(&user.email).await?;

    Ok(Json(markers))
}

/// View another user's map read-only.
///
/// GET /markers/user/{email}
///
/// Logged-in viewers leave a visit in the target's log; anonymous
/// viewers don't.
///
/// # Errors
///
/// Returns 400 for a malformed email and 404 if no such user exists.
#[instrument(skip(state))]
pub async fn user_map(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(email): Path<String>,
) -> Result<Json<UserMap>> {
    let target = Email::parse(&email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());
    let map = service.public_map(&target, viewer.as_ref()).await?;

    Ok(Json(map))
}

/// Partially update a marker.
///
/// PUT /markers/{id}
///
/// Only fields present in the body are applied. Changing the
/// location name re-geocodes it.
///
/// # Errors
///
/// Returns 400 for malformed input and 404 if the marker is missing,
/// owned by someone else, or the new location doesn't geocode.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<MarkerUpdate>,
) -> Result<Json<Marker>> {
    let id = parse_marker_id(&id)?;

    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());
    let marker = service.update(id, &user.email, req).await?;

    Ok(Json(marker))
}

/// Replace a marker's image.
///
/// PUT /markers/{id}/image
///
/// Accepts a multipart form with a single `image` file part. The
/// bytes always go through the image store.
///
/// # Errors
///
/// Returns 400 if the form has no usable image part and 404 if the
/// marker is missing or owned by someone else.
#[instrument(skip(state, multipart))]
pub async fn update_image(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Marker>> {
    let id = parse_marker_id(&id)?;

    let mut image: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
            image = Some((bytes.to_vec(), filename));
        }
    }

    let Some((bytes, filename)) = image else {
        return Err(AppError::BadRequest("missing image field".to_string()));
    };

    if bytes.is_empty() {
        return Err(AppError::BadRequest("image is empty".to_string()));
    }

    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());
    let marker = service
        .update_image(id, &user.email, bytes, filename)
        .await?;

    Ok(Json(marker))
}

/// Delete a marker.
///
/// DELETE /markers/{id}
///
/// Responds 204 when deleted. A missing marker and someone else's
/// marker both produce the same 404.
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if nothing was deleted.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_marker_id(&id)?;

    let service = MarkerService::new(state.pool(), state.geocoder(), state.images());
    let deleted = service.delete(id, &user.email).await?;

    if !deleted {
        return Err(AppError::NotFound(
            "marker not found or not authorized".to_string(),
        ));
    }

    add_breadcrumb("marker", "Deleted marker", None);

    Ok(StatusCode::NO_CONTENT)
}

/// Parse a marker ID path segment, rejecting malformed IDs with a 400.
fn parse_marker_id(raw: &str) -> Result<MarkerId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("invalid marker id".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_id_accepts_uuid() {
        let id = parse_marker_id("8c2e4bd2-3d6b-4f9a-9f6e-2b8a1c0d5e7f").unwrap();
        assert_eq!(
            id.to_string(),
            "8c2e4bd2-3d6b-4f9a-9f6e-2b8a1c0d5e7f"
        );
    }

    #[test]
    fn test_parse_marker_id_rejects_garbage() {
        let err = parse_marker_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_create_request_deserializes_minimal_body() {
        let req: CreateMarkerRequest =
            serde_json::from_str(r#"{"location_name": "Lisbon"}"#).unwrap();

        assert_eq!(req.location_name, "Lisbon");
        assert!(req.description.is_none());
        assert!(req.image_url.is_none());
    }

    #[test]
    fn test_create_request_accepts_explicit_nulls() {
        let req: CreateMarkerRequest = serde_json::from_str(
            r#"{"location_name": "Lisbon", "description": null, "image_url": null}"#,
        )
        .unwrap();

        assert!(req.description.is_none());
        assert!(req.image_url.is_none());
    }
}
