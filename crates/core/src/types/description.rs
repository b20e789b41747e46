//! Marker description type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Description`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum DescriptionError {
    /// The input string is empty after trimming.
    #[error("description cannot be empty; omit the field instead")]
    Empty,
    /// The input string is too long.
    #[error("description must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Free-text notes attached to a marker.
///
/// A marker's description is optional at the domain level; this type models
/// the present case. An empty string is rejected rather than stored, so
/// "no description" has exactly one representation (`None`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Maximum length of a description.
    pub const MAX_LENGTH: usize = 1000;

    /// Parse a `Description` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty after trimming or longer than
    /// 1000 characters.
    pub fn parse(s: &str) -> Result<Self, DescriptionError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(DescriptionError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(DescriptionError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the description as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Description` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
