//! Location name and coordinate types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LocationName`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum LocationNameError {
    /// The input string is empty after trimming.
    #[error("location name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("location name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A human-entered place name, as sent to the geocoder.
///
/// The name is free text ("Eiffel Tower", "Calle Mayor 1, Madrid"), trimmed
/// of surrounding whitespace and limited to 200 characters. It is the only
/// location input a user ever supplies; coordinates always come from
/// geocoding the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct LocationName(String);

impl LocationName {
    /// Maximum length of a location name.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `LocationName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty after trimming or longer than
    /// 200 characters.
    pub fn parse(s: &str) -> Result<Self, LocationNameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(LocationNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(LocationNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the location name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `LocationName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LocationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CoordinatesError {
    /// Latitude outside the -90..=90 range.
    #[error("latitude {0} is out of range (-90 to 90)")]
    LatitudeOutOfRange(f64),
    /// Longitude outside the -180..=180 range.
    #[error("longitude {0} is out of range (-180 to 180)")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 coordinate pair.
///
/// Coordinates are produced by the geocoder, never accepted from clients.
/// The range check exists to catch malformed geocoder responses before they
/// reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Construct a coordinate pair, validating ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if latitude is outside -90..=90 or longitude is
    /// outside -180..=180.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        // NaN fails the range checks too
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_names() {
        assert!(LocationName::parse("Eiffel Tower").is_ok());
        assert!(LocationName::parse("Calle Mayor 1, Madrid").is_ok());
        assert!(LocationName::parse("東京タワー").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let name = LocationName::parse("  Lisbon  ").unwrap();
        assert_eq!(name.as_str(), "Lisbon");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            LocationName::parse(""),
            Err(LocationNameError::Empty)
        ));
        assert!(matches!(
            LocationName::parse("   "),
            Err(LocationNameError::Empty)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(201);
        assert!(matches!(
            LocationName::parse(&long),
            Err(LocationNameError::TooLong { max: 200 })
        ));
    }

    #[test]
    fn test_max_length_counts_chars_not_bytes() {
        // 200 multibyte chars are within the limit even though the byte
        // length is far larger
        let name = "ü".repeat(200);
        assert!(LocationName::parse(&name).is_ok());
    }

    #[test]
    fn test_coordinates_valid() {
        let coords = Coordinates::new(40.4168, -3.7038).unwrap();
        assert!((coords.latitude - 40.4168).abs() < f64::EPSILON);
        assert!((coords.longitude + 3.7038).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coordinates_extremes() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_coordinates_out_of_range() {
        assert!(matches!(
            Coordinates::new(90.1, 0.0),
            Err(CoordinatesError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -180.5),
            Err(CoordinatesError::LongitudeOutOfRange(_))
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_coordinates_serde_shape() {
        let coords = Coordinates::new(48.8584, 2.2945).unwrap();
        let json = serde_json::to_value(coords).unwrap();
        assert_eq!(json["latitude"], 48.8584);
        assert_eq!(json["longitude"], 2.2945);
    }
}
