//! Catalog designations and display-name resolution.
//!
//! A star can be listed in several catalogs. Its display name is taken
//! from the first catalog in [`CATALOG_PRECEDENCE`] that lists it. Named
//! catalogs (`proper`, `bf`, `gl`) yield the raw identifier; numbered
//! catalogs (`hr`, `hd`, `hip`) yield `"<TAG> <number>"`, e.g. `"HIP 32349"`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StarError;

/// A catalog a star designation can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogTag {
    /// Proper name ("Sirius").
    Proper,
    /// Bayer / Flamsteed designation ("9Alp CMa").
    Bf,
    /// Gliese catalog ("Gl 244A").
    Gl,
    /// Harvard Revised (Yale Bright Star).
    Hr,
    /// Henry Draper.
    Hd,
    /// Hipparcos.
    Hip,
}

/// Order in which catalogs are tried when resolving a display name.
pub const CATALOG_PRECEDENCE: [CatalogTag; 6] = [
    CatalogTag::Proper,
    CatalogTag::Bf,
    CatalogTag::Gl,
    CatalogTag::Hr,
    CatalogTag::Hd,
    CatalogTag::Hip,
];

impl CatalogTag {
    /// Lower-case tag as stored in catalog data.
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogTag::Proper => "proper",
            CatalogTag::Bf => "bf",
            CatalogTag::Gl => "gl",
            CatalogTag::Hr => "hr",
            CatalogTag::Hd => "hd",
            CatalogTag::Hip => "hip",
        }
    }

    /// Whether identifiers in this catalog are plain numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, CatalogTag::Hr | CatalogTag::Hd | CatalogTag::Hip)
    }

    /// Formats an identifier from this catalog as a display name.
    ///
    /// # Example
    ///
    /// ```
    /// use star_core::CatalogTag;
    ///
    /// assert_eq!(CatalogTag::Hip.display_name("32349"), "HIP 32349");
    /// assert_eq!(CatalogTag::Proper.display_name("Sirius"), "Sirius");
    /// ```
    pub fn display_name(self, identifier: &str) -> String {
        if self.is_numeric() {
            format!("{} {identifier}", self.as_str().to_uppercase())
        } else {
            identifier.to_string()
        }
    }
}

impl fmt::Display for CatalogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogTag {
    type Err = StarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG_PRECEDENCE
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| StarError::InvalidCatalogTag {
                value: s.to_string(),
            })
    }
}

/// A star's listing in one catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAssociation {
    pub star_id: u64,
    pub catalog_tag: CatalogTag,
    pub identifier: String,
}

/// Resolves a star id to its preferred display name.
///
/// Implementations must fail with [`StarError::UnresolvedName`] when the
/// star is not listed in any recognized catalog.
pub trait NameResolver: Send + Sync {
    fn resolve_name(&self, star_id: u64) -> Result<String, StarError>;
}

/// In-memory association table implementing [`NameResolver`].
///
/// # Example
///
/// ```
/// use star_core::{CatalogAssociation, CatalogNames, CatalogTag, NameResolver};
///
/// let names = CatalogNames::from_associations([
///     CatalogAssociation { star_id: 1, catalog_tag: CatalogTag::Hip, identifier: "32349".into() },
///     CatalogAssociation { star_id: 1, catalog_tag: CatalogTag::Proper, identifier: "Sirius".into() },
/// ]);
/// assert_eq!(names.resolve_name(1).unwrap(), "Sirius");
/// assert!(names.resolve_name(2).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogNames {
    by_star: HashMap<u64, Vec<(CatalogTag, String)>>,
    len: usize,
}

impl CatalogNames {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a sequence of associations.
    pub fn from_associations(associations: impl IntoIterator<Item = CatalogAssociation>) -> Self {
        let mut names = Self::new();
        for association in associations {
            names.insert(association);
        }
        names
    }

    /// Adds one association. A later association for the same star and
    /// catalog replaces the earlier one.
    pub fn insert(&mut self, association: CatalogAssociation) {
        let listings = self.by_star.entry(association.star_id).or_default();
        match listings
            .iter_mut()
            .find(|(tag, _)| *tag == association.catalog_tag)
        {
            Some(existing) => existing.1 = association.identifier,
            None => {
                listings.push((association.catalog_tag, association.identifier));
                self.len += 1;
            }
        }
    }

    /// Catalog tags a star is listed in, in insertion order.
    pub fn tags_of(&self, star_id: u64) -> impl Iterator<Item = CatalogTag> + '_ {
        self.by_star
            .get(&star_id)
            .into_iter()
            .flat_map(|listings| listings.iter().map(|(tag, _)| *tag))
    }

    /// Total number of associations.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no associations are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl NameResolver for CatalogNames {
    fn resolve_name(&self, star_id: u64) -> Result<String, StarError> {
        let listings = self
            .by_star
            .get(&star_id)
            .ok_or(StarError::UnresolvedName { star_id })?;
        CATALOG_PRECEDENCE
            .into_iter()
            .find_map(|tag| {
                listings
                    .iter()
                    .find(|(listed, _)| *listed == tag)
                    .map(|(_, identifier)| tag.display_name(identifier))
            })
            .ok_or(StarError::UnresolvedName { star_id })
    }
}
