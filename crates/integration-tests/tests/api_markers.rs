//! Integration tests for marker CRUD and public map access.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p waymark-server)
//! - For the seeded-data test: demo data (cargo run -p waymark-cli -- seed)
//!
//! Run with: cargo test -p waymark-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;
use waymark_core::Email;

/// Base URL for the API (configurable via environment).
fn api_base_url() -> String {
    std::env::var("WAYMARK_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Create a client with a cookie store.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

// ============================================================================
// Authentication Guard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_create_marker_requires_auth() {
    let base_url = api_base_url();

    let resp = client()
        .post(format!("{base_url}/markers"))
        .json(&json!({"location_name": "Lisbon, Portugal"}))
        .send()
        .await
        .expect("Failed to reach create endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_my_markers_requires_auth() {
    let base_url = api_base_url();

    let resp = client()
        .get(format!("{base_url}/markers/my-markers"))
        .send()
        .await
        .expect("Failed to reach my-markers endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_update_marker_requires_auth() {
    let base_url = api_base_url();
    let marker_id = Uuid::new_v4();

    let resp = client()
        .put(format!("{base_url}/markers/{marker_id}"))
        .json(&json!({"location_name": "Porto, Portugal"}))
        .send()
        .await
        .expect("Failed to reach update endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_update_marker_image_requires_auth() {
    let base_url = api_base_url();
    let marker_id = Uuid::new_v4();

    let resp = client()
        .put(format!("{base_url}/markers/{marker_id}/image"))
        .send()
        .await
        .expect("Failed to reach image endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_delete_marker_requires_auth() {
    let base_url = api_base_url();
    let marker_id = Uuid::new_v4();

    let resp = client()
        .delete(format!("{base_url}/markers/{marker_id}"))
        .send()
        .await
        .expect("Failed to reach delete endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Public Map Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running waymark-server and database"]
async fn test_public_map_unknown_user() {
    let base_url = api_base_url();

    // Unique address so it cannot collide with a real account
    let email = Email::parse(&format!("nobody-{}@example.com", Uuid::new_v4()))
        .expect("Test email should be valid");

    let resp = client()
        .get(format!("{base_url}/markers/user/{email}"))
        .send()
        .await
        .expect("Failed to reach public map endpoint");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert!(body.get("error").is_some());
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_public_map_rejects_invalid_email() {
    let base_url = api_base_url();

    let resp = client()
        .get(format!("{base_url}/markers/user/not-an-email"))
        .send()
        .await
        .expect("Failed to reach public map endpoint");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running waymark-server and seeded demo data"]
async fn test_public_map_readable_without_auth() {
    let base_url = api_base_url();

    // Seeded by: cargo run -p waymark-cli -- seed
    let resp = client()
        .get(format!("{base_url}/markers/user/ada@example.com"))
        .send()
        .await
        .expect("Failed to reach public map endpoint");

    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse map body");
    assert_eq!(body.get("user_email"), Some(&Value::from("ada@example.com")));
    assert!(body.get("user_name").is_some());

    let markers = body
        .get("markers")
        .and_then(Value::as_array)
        .expect("Map should contain a markers array");
    assert!(!markers.is_empty(), "Seeded user should have markers");

    // Every marker carries resolved coordinates
    for marker in markers {
        assert!(marker.get("latitude").is_some());
        assert!(marker.get("longitude").is_some());
    }
}
