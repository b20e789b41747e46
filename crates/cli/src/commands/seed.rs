//! Seed the database with demo users and markers.
//!
//! Demo accounts carry the `demo` OAuth provider so they can be told apart
//! from real Google accounts and wiped with `seed --clear`. Coordinates are
//! fixed rather than geocoded, so seeding works offline.

use secrecy::SecretString;
use tracing::info;

use waymark_core::{Coordinates, Description, Email, LocationName};
use waymark_server::db::{self, MarkerRepository, UserRepository, VisitRepository};
use waymark_server::models::{NewMarker, NewVisit};

/// OAuth provider recorded on seeded accounts.
const DEMO_PROVIDER: &str = "demo";

/// A demo marker: location name, latitude, longitude, optional description.
type DemoMarker = (&'static str, f64, f64, Option<&'static str>);

/// Demo accounts with their markers.
const DEMO_USERS: &[(&str, &str, &[DemoMarker])] = &[
    (
        "ada@example.com",
        "Ada Lovelace",
        &[
            ("London, UK", 51.5074, -0.1278, Some("Where it all started")),
            ("Paris, France", 48.8566, 2.3522, None),
        ],
    ),
    (
        "marco@example.com",
        "Marco Polo",
        &[
            ("Venice, Italy", 45.4408, 12.3155, Some("Home port")),
            ("Istanbul, Turkey", 41.0082, 28.9784, None),
            ("Beijing, China", 39.9042, 116.4074, Some("End of the road")),
        ],
    ),
];

/// Seed demo users, markers, and a sample visit.
///
/// # Arguments
///
/// * `clear` - If true, delete previously seeded demo accounts first
///   (markers and visits cascade with them).
///
/// # Errors
///
/// Returns an error if `WAYMARK_DATABASE_URL` is missing, the demo data
/// fails validation, or a database operation fails.
pub async fn run(clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("WAYMARK_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "WAYMARK_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if clear {
        let deleted = sqlx::query("DELETE FROM app_user WHERE oauth_provider = $1")
            .bind(DEMO_PROVIDER)
            .execute(&pool)
            .await?
            .rows_affected();
        info!("Cleared {} existing demo accounts", deleted);
    }

    let users = UserRepository::new(&pool);
    let markers = MarkerRepository::new(&pool);
    let visits = VisitRepository::new(&pool);

    let mut users_created = 0;
    let mut markers_created = 0;

    for (index, (email, name, demo_markers)) in DEMO_USERS.iter().enumerate() {
        let email = Email::parse(email)?;
        let oauth_id = format!("demo-{index}");

        users
            .upsert_oauth_user(&email, name, None, DEMO_PROVIDER, &oauth_id)
            .await?;
        users_created += 1;
        info!("Seeded user: {} ({})", name, email);

        for &(location_name, latitude, longitude, description) in *demo_markers {
            let new = NewMarker {
                owner_email: email.clone(),
                location_name: LocationName::parse(location_name)?,
                coordinates: Coordinates::new(latitude, longitude)?,
                description: description.map(Description::parse).transpose()?,
                image_url: None,
            };
            markers.insert(&new).await?;
            markers_created += 1;
        }
    }

    // One sample visit so the visit log renders with data
    let visited = Email::parse("ada@example.com")?;
    let visitor = Email::parse("marco@example.com")?;
    visits
        .insert(&NewVisit {
            visited_user_email: visited,
            visitor_email: visitor,
            visitor_oauth_id: "demo-1".to_owned(),
        })
        .await?;

    info!("Seeding complete!");
    info!("  Users seeded: {users_created}");
    info!("  Markers seeded: {markers_created}");
    info!("  Visits seeded: 1");

    Ok(())
}
