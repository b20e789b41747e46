//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Service status
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth
//! GET  /auth/login/google      - Redirect to Google OAuth
//! GET  /auth/google/callback   - Handle OAuth callback
//! GET  /auth/me                - Current user profile
//! POST /auth/logout            - Clear the session
//!
//! # Markers
//! POST   /markers              - Create a marker
//! GET    /markers/my-markers   - Current user's markers
//! GET    /markers/user/{email} - Another user's map (read-only)
//! PUT    /markers/{id}         - Partial update (owner only)
//! PUT    /markers/{id}/image   - Replace image (owner only)
//! DELETE /markers/{id}         - Delete (owner only)
//!
//! # Visits
//! GET  /visits/my-visits       - Visits received, newest first
//! POST /visits/register        - Record a visit
//! ```

pub mod auth;
pub mod markers;
pub mod visits;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/google", get(auth::login))
        .route("/google/callback", get(auth::callback))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the marker routes router.
pub fn marker_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(markers::create))
        .route("/my-markers", get(markers::my_markers))
        .route("/user/{email}", get(markers::user_map))
        .route("/{id}", put(markers::update).delete(markers::delete))
        .route("/{id}/image", put(markers::update_image))
}

/// Create the visit routes router.
pub fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/my-visits", get(visits::my_visits))
        .route("/register", post(visits::register))
}

/// Service status payload for the root endpoint.
#[derive(Debug, Serialize)]
struct ServiceStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Service identification endpoint.
///
/// GET /
async fn status() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        service: "Waymark API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .nest("/auth", auth_routes())
        .nest("/markers", marker_routes())
        .nest("/visits", visit_routes())
}
