//! Tagged optional fields for partial updates.

use serde::{Deserialize, Deserializer};

/// A field in a partial-update request: either absent or set to a value.
///
/// A plain `Option<T>` cannot tell "leave this field alone" apart from
/// "clear this field". `Patch<T>` keeps the two distinct:
///
/// - a field missing from the JSON body deserializes to [`Patch::Omitted`]
///   (requires `#[serde(default)]` on the field)
/// - a field that is present deserializes to [`Patch::Set`]
///
/// For clearable fields use `Patch<Option<T>>`: `null` then means
/// `Set(None)` (clear), while omission still means `Omitted` (keep).
///
/// ```
/// use serde::Deserialize;
/// use waymark_core::Patch;
///
/// #[derive(Deserialize)]
/// struct Update {
///     #[serde(default)]
///     note: Patch<Option<String>>,
/// }
///
/// let keep: Update = serde_json::from_str("{}").unwrap();
/// assert_eq!(keep.note, Patch::Omitted);
///
/// let clear: Update = serde_json::from_str(r#"{"note": null}"#).unwrap();
/// assert_eq!(clear.note, Patch::Set(None));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Patch<T> {
    /// The field was not present in the request; keep the current value.
    Omitted,
    /// The field was present; replace the current value with this one.
    Set(T),
}

impl<T> Patch<T> {
    /// Returns `true` if the field was absent from the request.
    #[must_use]
    pub const fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }

    /// Returns `true` if the field carries a new value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Converts from `&Patch<T>` to `Patch<&T>`.
    #[must_use]
    pub const fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Omitted => Patch::Omitted,
            Self::Set(value) => Patch::Set(value),
        }
    }

    /// Maps the set value, leaving `Omitted` untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Omitted => Patch::Omitted,
            Self::Set(value) => Patch::Set(f(value)),
        }
    }

    /// Returns the set value, or `None` if the field was omitted.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Omitted => None,
            Self::Set(value) => Some(value),
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Omitted
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Self::Set(value)
    }
}

// Present fields always deserialize to Set; Omitted only ever comes from
// #[serde(default)] on a missing field.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Set)
    }
}
