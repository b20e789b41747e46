//! Integration tests for the visit log.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p waymark-server)
//!
//! Run with: cargo test -p waymark-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::json;

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
async fn test_my_visits_requires_auth() {
    let base_url = api_base_url();

    let resp = client()
        .get(format!("{base_url}/visits/my-visits"))
        .send()
        .await
        .expect("Failed to reach my-visits endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running waymark-server"]
async fn test_register_visit_requires_auth() {
    let base_url = api_base_url();

    let resp = client()
        .post(format!("{base_url}/visits/register"))
        .json(&json!({"visited_user_email": "ada@example.com"}))
        .send()
        .await
        .expect("Failed to reach register endpoint");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
