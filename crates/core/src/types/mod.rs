//! Core types for Waymark.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod description;
pub mod email;
pub mod id;
pub mod location;
pub mod patch;

pub use description::{Description, DescriptionError};
pub use email::{Email, EmailError};
pub use id::*;
pub use location::{Coordinates, CoordinatesError, LocationName, LocationNameError};
pub use patch::Patch;
