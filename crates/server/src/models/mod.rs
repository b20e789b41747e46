//! Domain models for the Waymark API.
//!
//! These types represent validated domain objects separate from database
//! row types and request payloads.

pub mod marker;
pub mod session;
pub mod user;
pub mod visit;

pub use marker::{Marker, MarkerUpdate, NewMarker, UserMap};
pub use session::CurrentUser;
pub use session::keys as session_keys;
pub use user::User;
pub use visit::{NewVisit, Visit};
