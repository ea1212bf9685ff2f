//! Range queries: locate the run of entries inside `[minimum, maximum]`.
//!
//! Each bound is found by a binary search that probes adjacent pairs
//! `(mid, mid + 1)` of the stored sequence. Once a pair straddles the key
//! the bound is settled locally, walking through a run of duplicates equal
//! to the key when needed:
//!
//! - lower bound: first position whose value is `>= minimum`
//! - upper bound: last position whose value is `<= maximum`
//!
//! A key equal to one side of a pair of distinct values resolves to that
//! value's own position (the textbook bound), not to the neighbouring
//! position. On `[1, 2, 3]` the query `[2, 2]` therefore matches exactly
//! one entry.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use star_core::{Entry, StarError};

use crate::index::RankedIndex;

/// Marker reported in every field of a query that matched nothing.
pub const NO_MATCH: &str = "-";

/// Inclusive run of positions in the sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeResult {
    pub min_index: usize,
    pub max_index: usize,
}

impl RangeResult {
    /// Number of entries in the run.
    pub fn count(&self) -> usize {
        self.max_index - self.min_index + 1
    }
}

/// Outcome of [`RankedIndex::range_query`].
///
/// Serializes as `{"minimum": Entry, "maximum": Entry, "sum": n}` on a
/// match and as `{"minimum": "-", "maximum": "-", "sum": "-"}` otherwise.
///
/// # Example
///
/// ```
/// use star_core::Entry;
/// use star_search::RangeSummary;
///
/// let json = serde_json::to_string(&RangeSummary::NoMatch).unwrap();
/// assert_eq!(json, r#"{"minimum":"-","maximum":"-","sum":"-"}"#);
///
/// let hit = RangeSummary::Match {
///     minimum: Entry::new("A", 1.0),
///     maximum: Entry::new("B", 2.0),
///     sum: 2,
/// };
/// assert_eq!(hit.sum(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSummary {
    NoMatch,
    Match {
        /// First entry of the run.
        minimum: Entry,
        /// Last entry of the run.
        maximum: Entry,
        /// Number of entries in the run.
        sum: usize,
    },
}

impl RangeSummary {
    pub fn is_match(&self) -> bool {
        matches!(self, RangeSummary::Match { .. })
    }

    pub fn minimum(&self) -> Option<&Entry> {
        match self {
            RangeSummary::Match { minimum, .. } => Some(minimum),
            RangeSummary::NoMatch => None,
        }
    }

    pub fn maximum(&self) -> Option<&Entry> {
        match self {
            RangeSummary::Match { maximum, .. } => Some(maximum),
            RangeSummary::NoMatch => None,
        }
    }

    pub fn sum(&self) -> Option<usize> {
        match self {
            RangeSummary::Match { sum, .. } => Some(*sum),
            RangeSummary::NoMatch => None,
        }
    }
}

impl Serialize for RangeSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RangeSummary", 3)?;
        match self {
            RangeSummary::NoMatch => {
                state.serialize_field("minimum", NO_MATCH)?;
                state.serialize_field("maximum", NO_MATCH)?;
                state.serialize_field("sum", NO_MATCH)?;
            }
            RangeSummary::Match {
                minimum,
                maximum,
                sum,
            } => {
                state.serialize_field("minimum", minimum)?;
                state.serialize_field("maximum", maximum)?;
                state.serialize_field("sum", sum)?;
            }
        }
        state.end()
    }
}

/// Which side of the interval a search resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Lower,
    Upper,
}

/// Binary search for one bound over `length` sorted values.
///
/// `value_at` reads the value at a position; it is called O(log n) times
/// plus once per element of a duplicate run at the boundary.
pub(crate) fn find_bound<F>(
    length: usize,
    key: f64,
    bound: Bound,
    mut value_at: F,
) -> Result<Option<usize>, StarError>
where
    F: FnMut(usize) -> Result<f64, StarError>,
{
    match length {
        0 => return Ok(None),
        1 => {
            let only = value_at(0)?;
            let hit = match bound {
                Bound::Lower => only >= key,
                Bound::Upper => only <= key,
            };
            return Ok(hit.then_some(0));
        }
        _ => {}
    }

    let mut left = 0;
    let mut right = length - 1;
    let mut mid = 0;
    while left < right {
        mid = (left + right) / 2;
        let first = value_at(mid)?;
        let second = value_at(mid + 1)?;

        if first <= key && key <= second {
            let position = match bound {
                Bound::Lower if first < key => mid + 1,
                Bound::Lower => {
                    // walk back to the start of the run equal to the key
                    let mut start = mid;
                    while start > 0 && value_at(start - 1)? == key {
                        start -= 1;
                    }
                    start
                }
                Bound::Upper if key < second => mid,
                Bound::Upper => {
                    let mut end = mid + 1;
                    while end + 1 < length && value_at(end + 1)? == key {
                        end += 1;
                    }
                    end
                }
            };
            return Ok(Some(position));
        }

        if first < key {
            left = mid + 1;
        } else {
            right = mid;
        }
    }

    // No pair straddles the key: every value lies on one side of it.
    let found = match bound {
        Bound::Lower => (value_at(mid)? >= key).then_some(mid),
        Bound::Upper => (value_at(mid + 1)? <= key).then_some(mid + 1),
    };
    Ok(found)
}

impl RankedIndex {
    /// Finds the run of entries with values in `[minimum, maximum]` and
    /// caches it for [`RankedIndex::list_page`].
    ///
    /// A query that matches nothing (including `minimum > maximum`, NaN
    /// bounds, or an empty index) clears the cached run and returns
    /// [`RangeSummary::NoMatch`]. Concurrent queries on one handle are
    /// last-writer-wins.
    ///
    /// # Errors
    ///
    /// - [`StarError::IndexNotFound`] if the index was closed.
    /// - [`StarError::MissingEntry`] / [`StarError::StorageError`] if the
    ///   store no longer holds the index rows.
    pub fn range_query(&self, minimum: f64, maximum: f64) -> Result<RangeSummary, StarError> {
        self.ensure_open()?;

        let lower = find_bound(self.len(), minimum, Bound::Lower, |i| {
            self.entry_at(i).map(|e| e.value)
        })?;
        let upper = find_bound(self.len(), maximum, Bound::Upper, |i| {
            self.entry_at(i).map(|e| e.value)
        })?;

        let found = match (lower, upper) {
            (Some(min_index), Some(max_index)) => {
                let low = self.entry_at(min_index)?;
                let high = self.entry_at(max_index)?;
                if low.value > high.value || min_index > max_index {
                    None
                } else {
                    Some((RangeResult { min_index, max_index }, low, high))
                }
            }
            _ => None,
        };

        let mut slot = self.range_slot()?;
        let summary = match found {
            Some((range, low, high)) => {
                *slot = Some(range);
                RangeSummary::Match {
                    minimum: low,
                    maximum: high,
                    sum: range.count(),
                }
            }
            None => {
                *slot = None;
                RangeSummary::NoMatch
            }
        };

        tracing::debug!(
            session = %self.session_key(),
            attribute = %self.attribute(),
            minimum,
            maximum,
            range = ?slot.as_ref(),
            "range query"
        );
        Ok(summary)
    }
}
