//! In-memory star catalog: selection by constellation or sky polygon, and
//! summary statistics over a selection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogAssociation, CatalogNames};
use crate::error::StarError;
use crate::geometry::{polygon_contains, SkyPoint};
use crate::star::Star;

/// The 88 IAU constellations, as lower-case three-letter tags.
pub const LIST_OF_CONSTELLATIONS: [&str; 88] = [
    "and", "ant", "aps", "aql", "aqr", "ara", "ari", "aur", "boo", "cae",
    "cam", "cap", "car", "cas", "cen", "cep", "cet", "cha", "cir", "cma",
    "cmi", "cnc", "col", "com", "cra", "crb", "crt", "cru", "crv", "cvn",
    "cyg", "del", "dor", "dra", "equ", "eri", "for", "gem", "gru", "her",
    "hor", "hya", "hyi", "ind", "lac", "leo", "lep", "lib", "lmi", "lup",
    "lyn", "lyr", "men", "mic", "mon", "mus", "nor", "oct", "oph", "ori",
    "pav", "peg", "per", "phe", "pic", "psa", "psc", "pup", "pyx", "ret",
    "scl", "sco", "sct", "ser", "sex", "sge", "sgr", "tau", "tel", "tra",
    "tri", "tuc", "uma", "umi", "vel", "vir", "vol", "vul",
];

/// Returns `true` if `tag` names a known constellation.
pub fn is_constellation(tag: &str) -> bool {
    LIST_OF_CONSTELLATIONS.contains(&tag)
}

/// On-disk layout of a catalog file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stars: Vec<Star>,
    #[serde(default)]
    associations: Vec<CatalogAssociation>,
}

/// Stars plus their catalog designations.
///
/// # Example
///
/// ```
/// use star_core::sky::StarCatalog;
/// use star_core::{CatalogAssociation, CatalogTag, Star};
///
/// let mut star = Star::new(1, 2.6, -1.4, 1.4);
/// star.con = Some("cma".into());
/// let catalog = StarCatalog::new(
///     vec![star],
///     vec![CatalogAssociation { star_id: 1, catalog_tag: CatalogTag::Proper, identifier: "Sirius".into() }],
/// );
/// assert_eq!(catalog.select_constellation("cma").unwrap().len(), 1);
/// assert!(catalog.select_constellation("xyz").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StarCatalog {
    stars: Vec<Star>,
    names: CatalogNames,
}

impl StarCatalog {
    pub fn new(stars: Vec<Star>, associations: Vec<CatalogAssociation>) -> Self {
        Self {
            stars,
            names: CatalogNames::from_associations(associations),
        }
    }

    /// Loads a catalog from a JSON file of the form
    /// `{"stars": [...], "associations": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`StarError::CatalogError`] if the file cannot be read or
    /// parsed.
    pub fn load_json(path: &Path) -> Result<Self, StarError> {
        let raw = fs::read_to_string(path).map_err(|e| StarError::CatalogError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let file: CatalogFile = serde_json::from_str(&raw).map_err(|e| StarError::CatalogError {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;
        tracing::info!(
            stars = file.stars.len(),
            associations = file.associations.len(),
            "loaded star catalog from {}",
            path.display()
        );
        Ok(Self::new(file.stars, file.associations))
    }

    /// All stars in the catalog.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// The designation table, usable as a [`crate::NameResolver`].
    pub fn names(&self) -> &CatalogNames {
        &self.names
    }

    /// Stars in the given constellation, or `None` for an unknown tag.
    pub fn select_constellation(&self, tag: &str) -> Option<Vec<Star>> {
        if !is_constellation(tag) {
            return None;
        }
        Some(
            self.stars
                .iter()
                .filter(|star| star.con.as_deref() == Some(tag))
                .cloned()
                .collect(),
        )
    }

    /// Stars whose position lies inside the polygon.
    pub fn select_polygon(&self, points: &[SkyPoint]) -> Vec<Star> {
        self.stars
            .iter()
            .filter(|star| polygon_contains(points, star.ra, star.dec))
            .cloned()
            .collect()
    }

    /// Summary statistics over a polygon selection.
    ///
    /// The catalog breakdown counts one share per designation, so a star
    /// listed in two catalogs counts twice and a star without any
    /// designation not at all.
    pub fn statistics(&self, stars: &[Star]) -> SearchStatistics {
        self.breakdown(stars, false)
    }

    /// Summary statistics over a constellation selection.
    ///
    /// Like [`StarCatalog::statistics`], except that every star without a
    /// designation adds one share under a `null` catalog tag.
    pub fn constellation_statistics(&self, stars: &[Star]) -> SearchStatistics {
        self.breakdown(stars, true)
    }

    fn breakdown(&self, stars: &[Star], count_undesignated: bool) -> SearchStatistics {
        let mut catalogs: HashMap<Option<String>, usize> = HashMap::new();
        let mut spects: HashMap<Option<String>, usize> = HashMap::new();
        let mut constellations: HashMap<Option<String>, usize> = HashMap::new();

        for star in stars {
            let mut designated = false;
            for tag in self.names.tags_of(star.id) {
                designated = true;
                *catalogs.entry(Some(tag.as_str().to_string())).or_default() += 1;
            }
            if !designated && count_undesignated {
                *catalogs.entry(None).or_default() += 1;
            }
            *spects.entry(star.spect.clone()).or_default() += 1;
            *constellations.entry(star.con.clone()).or_default() += 1;
        }

        SearchStatistics {
            number_of_stars: stars.len(),
            catalogs: with_percentage(catalogs)
                .map(|(tag, percentage)| Share { tag, percentage })
                .collect(),
            spects: with_percentage(spects)
                .map(|(spect, percentage)| SpectShare { spect, percentage })
                .collect(),
            constellations: with_percentage(constellations)
                .map(|(tag, percentage)| Share { tag, percentage })
                .collect(),
        }
    }
}

/// Share of a selection falling into one catalog or constellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Category label; `None` for stars without one.
    pub tag: Option<String>,
    /// Percentage in `0..=100`.
    pub percentage: f64,
}

/// Share of a selection with one spectral class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectShare {
    pub spect: Option<String>,
    pub percentage: f64,
}

/// Category breakdown of a star selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub number_of_stars: usize,
    pub catalogs: Vec<Share>,
    pub spects: Vec<SpectShare>,
    pub constellations: Vec<Share>,
}

/// Converts counts into `(label, percentage)` pairs, sorted by percentage
/// descending and then by label.
fn with_percentage(
    counts: HashMap<Option<String>, usize>,
) -> impl Iterator<Item = (Option<String>, f64)> {
    let total: usize = counts.values().sum();
    let mut shares: Vec<(Option<String>, f64)> = counts
        .into_iter()
        .map(|(label, count)| (label, count as f64 / total as f64 * 100.0))
        .collect();
    shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares.into_iter()
}
