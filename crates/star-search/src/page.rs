//! Paginated listing over the run cached by the last range query.

use star_core::{Entry, StarError};

use crate::index::RankedIndex;
use crate::range::RangeResult;

/// Inclusive span of positions covered by one page, or `None` if the page
/// lies outside the run. Page numbers start at 1.
///
/// Ascending pages count up from `min_index`; descending pages count down
/// from `max_index`. The last page in either direction is clamped to the
/// run. A page size of 0 is treated as 1.
pub fn page_span(
    range: RangeResult,
    page: usize,
    page_size: usize,
    descending: bool,
) -> Option<(usize, usize)> {
    let page_size = page_size.max(1);
    let offset = page.checked_sub(1)?.checked_mul(page_size)?;
    if descending {
        let high = range.max_index.checked_sub(offset)?;
        if high < range.min_index {
            return None;
        }
        let low = (high + 1).saturating_sub(page_size).max(range.min_index);
        Some((low, high))
    } else {
        let low = range.min_index.checked_add(offset)?;
        if low > range.max_index {
            return None;
        }
        let high = low.saturating_add(page_size - 1).min(range.max_index);
        Some((low, high))
    }
}

impl RankedIndex {
    /// Returns page `page` (1-based) of the cached range, ascending or
    /// descending.
    ///
    /// Returns an empty vector when no range is cached, the index is
    /// closed, `page` is 0, or the page starts past the end of the range.
    /// Entries are read from the store on every call.
    ///
    /// # Errors
    ///
    /// Returns [`StarError::MissingEntry`] if a listed record is gone.
    pub fn list_page(&self, page: usize, descending: bool) -> Result<Vec<Entry>, StarError> {
        if self.is_closed() {
            return Ok(Vec::new());
        }
        let Some(range) = self.last_range()? else {
            return Ok(Vec::new());
        };
        let Some((low, high)) = page_span(range, page, self.page_size(), descending) else {
            return Ok(Vec::new());
        };

        let mut entries = self.entries_between(low, high)?;
        if descending {
            entries.reverse();
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(min_index: usize, max_index: usize) -> RangeResult {
        RangeResult {
            min_index,
            max_index,
        }
    }

    #[test]
    fn ascending_full_page() {
        assert_eq!(page_span(run(0, 9), 1, 10, false), Some((0, 9)));
        assert_eq!(page_span(run(0, 9), 2, 10, false), None);
    }

    #[test]
    fn descending_full_page() {
        assert_eq!(page_span(run(0, 9), 1, 10, true), Some((0, 9)));
        assert_eq!(page_span(run(0, 9), 2, 10, true), None);
    }

    #[test]
    fn ascending_last_page_is_clamped() {
        let range = run(5, 27);
        assert_eq!(page_span(range, 1, 10, false), Some((5, 14)));
        assert_eq!(page_span(range, 2, 10, false), Some((15, 24)));
        assert_eq!(page_span(range, 3, 10, false), Some((25, 27)));
        assert_eq!(page_span(range, 4, 10, false), None);
    }

    #[test]
    fn descending_last_page_is_clamped() {
        let range = run(5, 27);
        assert_eq!(page_span(range, 1, 10, true), Some((18, 27)));
        assert_eq!(page_span(range, 2, 10, true), Some((8, 17)));
        assert_eq!(page_span(range, 3, 10, true), Some((5, 7)));
        assert_eq!(page_span(range, 4, 10, true), None);
    }

    #[test]
    fn descending_near_zero_does_not_underflow() {
        let range = run(0, 3);
        assert_eq!(page_span(range, 1, 10, true), Some((0, 3)));
        assert_eq!(page_span(range, 2, 10, true), None);
        assert_eq!(page_span(range, usize::MAX, 10, true), None);
    }

    #[test]
    fn page_zero_is_empty() {
        assert_eq!(page_span(run(0, 9), 0, 10, false), None);
        assert_eq!(page_span(run(0, 9), 0, 10, true), None);
    }

    #[test]
    fn single_entry_range() {
        assert_eq!(page_span(run(4, 4), 1, 10, false), Some((4, 4)));
        assert_eq!(page_span(run(4, 4), 1, 10, true), Some((4, 4)));
    }
}
