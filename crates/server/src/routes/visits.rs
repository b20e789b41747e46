//! Visit route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use waymark_core::Email;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Visit;
use crate::services::VisitService;
use crate::state::AppState;

/// List visits received by the current user, newest first.
///
/// GET /visits/my-visits
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state))]
pub async fn my_visits(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Visit>>> {
    let service = VisitService::new(state.pool());
    let visits = service.list_received(&user.email).await?;

    Ok(Json(visits))
}

/// Request body for registering a visit.
#[derive(Debug, Deserialize)]
pub struct RegisterVisitRequest {
    /// Email of the user whose map was viewed.
    pub visited_user_email: String,
}

/// Record a visit to another user's map.
///
/// POST /visits/register
///
/// Responds 201 with the recorded visit, or 204 when the caller
/// visits their own map (self-visits are never logged).
///
/// # Errors
///
/// Returns 400 for a malformed email and 404 if the visited user
/// doesn't exist.
#[instrument(skip(state))]
pub async fn register(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<RegisterVisitRequest>,
) -> Result<Response> {
    let visited = Email::parse(&req.visited_user_email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let service = VisitService::new(state.pool());
    let visit = service.record(&visited, &user.email, &user.oauth_id).await?;

    match visit {
        Some(visit) => Ok((StatusCode::CREATED, Json(visit)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserializes() {
        let req: RegisterVisitRequest =
            serde_json::from_str(r#"{"visited_user_email": "ada@example.com"}"#).unwrap();

        assert_eq!(req.visited_user_email, "ada@example.com");
    }

    #[test]
    fn test_register_request_requires_email_field() {
        let result = serde_json::from_str::<RegisterVisitRequest>("{}");
        assert!(result.is_err());
    }
}
