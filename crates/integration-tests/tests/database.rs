//! Database schema integration tests.
//!
//! These tests require a `PostgreSQL` database reachable via
//! `WAYMARK_DATABASE_URL` (defaults to a local `waymark_test` database).
//! They apply migrations themselves, so a bare database is fine.
//!
//! Run with: cargo test -p waymark-integration-tests -- --ignored

use sqlx::PgPool;

/// Connection string for the test database (configurable via environment).
fn database_url() -> String {
    std::env::var("WAYMARK_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/waymark_test".to_string())
}

async fn migrated_pool() -> PgPool {
    let pool = PgPool::connect(&database_url())
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Migrations failed");

    pool
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_migrations_apply_cleanly() {
    let pool = migrated_pool().await;

    // Spot-check the core tables exist
    for table in ["app_user", "marker", "visit"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Failed to query information_schema");

        assert!(exists, "table {table} missing after migrations");
    }
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_schema_rejects_self_visit() {
    let pool = migrated_pool().await;
    let email = format!("schema-test-{}@example.com", uuid::Uuid::new_v4());

    sqlx::query("INSERT INTO app_user (email, name, oauth_id) VALUES ($1, 'Schema Test', 'schema-test')")
        .bind(&email)
        .execute(&pool)
        .await
        .expect("Failed to insert test user");

    // Visiting your own map must never produce a log row
    let result = sqlx::query(
        "INSERT INTO visit (visited_user_email, visitor_email, visitor_oauth_id)
         VALUES ($1, $1, 'schema-test')",
    )
    .bind(&email)
    .execute(&pool)
    .await;

    assert!(result.is_err(), "self-visit insert should violate the check constraint");

    sqlx::query("DELETE FROM app_user WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .expect("Failed to clean up test user");
}
