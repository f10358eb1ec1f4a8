//! Station identifiers and records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// An iRail station identifier, e.g. `BE.NMBS.008812005`.
///
/// Identifiers are opaque to us, but they are never empty and never
/// contain whitespace.
///
/// # Examples
///
/// ```
/// use belgiantrain::domain::StationId;
///
/// let id = StationId::parse("BE.NMBS.008812005").unwrap();
/// assert_eq!(id.as_str(), "BE.NMBS.008812005");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("BE NMBS").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(InvalidStationId {
                reason: "must not contain whitespace",
            });
        }

        Ok(StationId(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StationId::parse(&value)
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station record as published by iRail.
///
/// Immutable once fetched; the directory replaces the whole list on refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    /// Localised display name (depends on the requested language).
    pub name: String,
    /// Canonical name, independent of language.
    pub standard_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Station {
    /// Latitude and longitude, if both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}
