//! Sky-region polygons in equatorial coordinates.
//!
//! Right ascension is in hours, declination in degrees. Polygons are
//! treated as planar in (ra, dec); no spherical correction is applied.

use serde::{Deserialize, Serialize};

/// Smallest number of vertices a search polygon may have.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Exclusive bound on `|ra|` for polygon vertices.
pub const RA_LIMIT: f64 = 24.0;

/// Inclusive bound on `|dec|` for polygon vertices.
pub const DEC_LIMIT: f64 = 90.0;

/// One polygon vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPoint {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

/// Returns `true` if every vertex has `-24 < ra < 24` and `-90 <= dec <= 90`.
///
/// # Example
///
/// ```
/// use star_core::geometry::{is_points_range_valid, SkyPoint};
///
/// assert!(is_points_range_valid(&[SkyPoint::new(1.0, 45.0)]));
/// assert!(!is_points_range_valid(&[SkyPoint::new(24.0, 0.0)]));
/// ```
pub fn is_points_range_valid(points: &[SkyPoint]) -> bool {
    points
        .iter()
        .all(|p| -RA_LIMIT < p.ra && p.ra < RA_LIMIT && (-DEC_LIMIT..=DEC_LIMIT).contains(&p.dec))
}

/// Even-odd crossing test: is `(ra, dec)` inside the polygon?
///
/// Each edge is half-open in declination, so a point on a shared vertex
/// is counted once.
///
/// # Example
///
/// ```
/// use star_core::geometry::{polygon_contains, SkyPoint};
///
/// let square = [
///     SkyPoint::new(0.0, 0.0),
///     SkyPoint::new(2.0, 0.0),
///     SkyPoint::new(2.0, 2.0),
///     SkyPoint::new(0.0, 2.0),
/// ];
/// assert!(polygon_contains(&square, 1.0, 1.0));
/// assert!(!polygon_contains(&square, 3.0, 1.0));
/// ```
pub fn polygon_contains(points: &[SkyPoint], ra: f64, dec: f64) -> bool {
    let mut inside = false;
    let Some(mut prev) = points.last().copied() else {
        return false;
    };
    for &cur in points {
        let spans = (cur.dec <= dec && dec < prev.dec) || (prev.dec <= dec && dec < cur.dec);
        if spans {
            let crossing = (prev.ra - cur.ra) * (dec - cur.dec) / (prev.dec - cur.dec) + cur.ra;
            if ra > crossing {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}
