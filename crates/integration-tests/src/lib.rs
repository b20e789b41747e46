//! Integration tests for Waymark.
//!
//! The tests in `tests/` exercise a running server over HTTP and are all
//! marked `#[ignore]` so `cargo test` stays fast and offline.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations to the test database
//! cargo run -p waymark-cli -- migrate
//!
//! # Start the server
//! cargo run -p waymark-server
//!
//! # Run the integration tests against it
//! cargo test -p waymark-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_auth` - Health checks and the sign-in surface
//! - `api_markers` - Marker CRUD and public map access
//! - `api_visits` - Visit log and registration
//! - `database` - Schema migration checks
//!
//! Set `WAYMARK_API_URL` to point the tests at a non-default server.
