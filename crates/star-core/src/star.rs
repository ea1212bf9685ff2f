//! Star records and the numeric attributes a ranked index is built over.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StarError;

/// One star from the catalog.
///
/// Only `id` and the three numeric fields take part in ranked indices.
/// Position, spectral class, and constellation are used by the selection
/// step that decides which stars go into an index.
///
/// # Example
///
/// ```
/// use star_core::{Attribute, Star};
///
/// let star = Star::new(1, 4.2, 1.5, 3.1);
/// assert_eq!(Attribute::Distance.value_of(&star), 4.2);
/// assert!(star.con.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Catalog-wide star identifier.
    pub id: u64,
    /// Distance in parsecs.
    pub dist: f64,
    /// Apparent visual magnitude.
    pub mag: f64,
    /// Absolute visual magnitude.
    pub absmag: f64,
    /// Right ascension in hours.
    #[serde(default)]
    pub ra: f64,
    /// Declination in degrees.
    #[serde(default)]
    pub dec: f64,
    /// Spectral class letter (`O`, `B`, `A`, ...), if known.
    #[serde(default)]
    pub spect: Option<String>,
    /// Lower-case three-letter constellation tag, if any.
    #[serde(default)]
    pub con: Option<String>,
}

impl Star {
    /// Creates a star with only the indexable fields set.
    pub fn new(id: u64, dist: f64, mag: f64, absmag: f64) -> Self {
        Self {
            id,
            dist,
            mag,
            absmag,
            ra: 0.0,
            dec: 0.0,
            spect: None,
            con: None,
        }
    }
}

/// A numeric star field a ranked index can be built over.
///
/// The wire names `dist`, `mag`, and `absmag` are the stable vocabulary
/// used by the HTTP layer and by store keys.
///
/// # Example
///
/// ```
/// use star_core::Attribute;
///
/// let attr: Attribute = "absmag".parse().unwrap();
/// assert_eq!(attr, Attribute::AbsoluteMagnitude);
/// assert_eq!(attr.as_str(), "absmag");
/// assert!("radius".parse::<Attribute>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "dist")]
    Distance,
    #[serde(rename = "mag")]
    Magnitude,
    #[serde(rename = "absmag")]
    AbsoluteMagnitude,
}

impl Attribute {
    /// Every attribute, in the order indices are built and evicted.
    pub const ALL: [Attribute; 3] = [
        Attribute::Distance,
        Attribute::Magnitude,
        Attribute::AbsoluteMagnitude,
    ];

    /// The wire name of this attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Distance => "dist",
            Attribute::Magnitude => "mag",
            Attribute::AbsoluteMagnitude => "absmag",
        }
    }

    /// Reads this attribute's value from a star.
    pub fn value_of(self, star: &Star) -> f64 {
        match self {
            Attribute::Distance => star.dist,
            Attribute::Magnitude => star.mag,
            Attribute::AbsoluteMagnitude => star.absmag,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = StarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| StarError::InvalidAttribute {
                value: s.to_string(),
            })
    }
}

/// One `(display name, value)` pair in a ranked index.
///
/// # Example
///
/// ```
/// use star_core::Entry;
///
/// let entry = Entry::new("Sirius", 2.64);
/// let json = serde_json::to_string(&entry).unwrap();
/// assert_eq!(json, r#"{"name":"Sirius","value":2.64}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Preferred catalog designation of the star.
    pub name: String,
    /// Value of the indexed attribute.
    pub value: f64,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_round_trips_through_wire_names() {
        for attr in Attribute::ALL {
            assert_eq!(attr.as_str().parse::<Attribute>().unwrap(), attr);
            assert_eq!(attr.to_string(), attr.as_str());
        }
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = "Dist".parse::<Attribute>().unwrap_err();
        assert_eq!(
            err,
            StarError::InvalidAttribute {
                value: "Dist".to_string()
            }
        );
    }

    #[test]
    fn attribute_serializes_with_wire_name() {
        let json = serde_json::to_string(&Attribute::AbsoluteMagnitude).unwrap();
        assert_eq!(json, "\"absmag\"");
        let back: Attribute = serde_json::from_str("\"mag\"").unwrap();
        assert_eq!(back, Attribute::Magnitude);
    }

    #[test]
    fn value_of_picks_the_matching_field() {
        let star = Star::new(9, 1.0, 2.0, 3.0);
        assert_eq!(Attribute::Distance.value_of(&star), 1.0);
        assert_eq!(Attribute::Magnitude.value_of(&star), 2.0);
        assert_eq!(Attribute::AbsoluteMagnitude.value_of(&star), 3.0);
    }

    #[test]
    fn star_deserializes_without_optional_fields() {
        let star: Star =
            serde_json::from_str(r#"{"id": 3, "dist": 1.5, "mag": 2.5, "absmag": 3.5}"#).unwrap();
        assert_eq!(star, Star::new(3, 1.5, 2.5, 3.5));
    }
}
