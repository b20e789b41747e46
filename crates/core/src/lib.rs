//! Waymark Core - Shared domain types.
//!
//! This crate provides common types used across all Waymark components:
//! - `server` - The public map API (markers, visits, auth)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, location names,
//!   descriptions, and coordinates, plus the [`types::Patch`] field wrapper
//!   used by partial updates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
