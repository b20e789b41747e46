//! Business logic services.
//!
//! # Services
//!
//! - `markers` - Marker lifecycle (geocoding, image upload, CRUD)
//! - `visits` - Visit logging and listing

pub mod markers;
pub mod visits;

pub use markers::{MarkerError, MarkerService};
pub use visits::{VisitError, VisitService};
