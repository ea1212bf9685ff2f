//! RankedIndex: construction, positional reads, and teardown.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use star_core::{Attribute, Entry, NameResolver, Star, StarError, PAGE_SIZE};
use star_db::{entry_key, list_key, star_entry_key, SharedStore};

use crate::range::RangeResult;

/// A sorted, store-backed sequence of entries for one
/// `(session key, attribute)` pair.
///
/// The stored sequence is immutable after [`RankedIndex::build`]. The only
/// mutable state is the cached [`RangeResult`] of the last range query,
/// which lives on the handle and never reaches the store.
///
/// # Lifecycle
///
/// 1. [`RankedIndex::build`] sorts the stars and writes one entry record
///    per star plus the ordered key list
/// 2. [`RankedIndex::range_query`] caches a `[min_index, max_index]` run
/// 3. [`RankedIndex::list_page`] pages through that run
/// 4. [`RankedIndex::close`] deletes every row the index wrote
pub struct RankedIndex {
    session_key: String,
    attribute: Attribute,
    length: usize,
    page_size: usize,
    list_key: String,
    store: SharedStore,
    last_range: Mutex<Option<RangeResult>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for RankedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedIndex")
            .field("session_key", &self.session_key)
            .field("attribute", &self.attribute)
            .field("length", &self.length)
            .field("page_size", &self.page_size)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RankedIndex {
    /// Builds an index over `stars`, sorted ascending by `attribute`.
    ///
    /// The sort is stable: stars with equal values keep their input order.
    /// Every display name is resolved before anything is written, so a
    /// star without a catalog designation aborts the build with
    /// [`StarError::UnresolvedName`] and leaves the store untouched.
    ///
    /// Stars sharing a display name keep separate records: the first in
    /// sorted order is stored under [`entry_key`], later ones under
    /// [`star_entry_key`].
    ///
    /// An empty `stars` slice yields an index of length 0 on which every
    /// range query reports no match.
    ///
    /// # Errors
    ///
    /// - [`StarError::UnresolvedName`] if any star has no designation.
    /// - [`StarError::DuplicateEntry`] if the same star appears twice.
    /// - [`StarError::StorageError`] if a store write fails; rows written
    ///   before the failure are left in place.
    pub fn build(
        session_key: &str,
        attribute: Attribute,
        stars: &[Star],
        resolver: &dyn NameResolver,
        store: SharedStore,
    ) -> Result<Self, StarError> {
        Self::build_with_page_size(session_key, attribute, stars, resolver, store, PAGE_SIZE)
    }

    /// Like [`RankedIndex::build`], with an explicit page size for
    /// [`RankedIndex::list_page`]. A page size of 0 is treated as 1.
    pub fn build_with_page_size(
        session_key: &str,
        attribute: Attribute,
        stars: &[Star],
        resolver: &dyn NameResolver,
        store: SharedStore,
        page_size: usize,
    ) -> Result<Self, StarError> {
        let mut sorted: Vec<&Star> = stars.iter().collect();
        sorted.sort_by(|a, b| attribute.value_of(a).total_cmp(&attribute.value_of(b)));

        let entries = sorted
            .iter()
            .map(|star| {
                resolver
                    .resolve_name(star.id)
                    .map(|name| (star.id, Entry::new(name, attribute.value_of(star))))
            })
            .collect::<Result<Vec<(u64, Entry)>, StarError>>()?;
        let keys = record_keys(session_key, attribute, &entries)?;

        let list_key = list_key(session_key, attribute);
        for (key, (_, entry)) in keys.iter().zip(&entries) {
            store.set_entry(key, entry)?;
            store.append_to_list(&list_key, key)?;
        }

        tracing::debug!(
            session = session_key,
            %attribute,
            length = entries.len(),
            "built ranked index"
        );

        Ok(Self {
            session_key: session_key.to_string(),
            attribute,
            length: entries.len(),
            page_size: page_size.max(1),
            list_key,
            store,
            last_range: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Number of entries, fixed at construction.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Entries returned per page by [`RankedIndex::list_page`].
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether [`RankedIndex::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The run cached by the last successful range query, if any.
    pub fn last_range(&self) -> Result<Option<RangeResult>, StarError> {
        Ok(*self.range_slot()?)
    }

    /// Reads the entry stored at `position` in the sorted sequence.
    ///
    /// # Errors
    ///
    /// Returns [`StarError::MissingEntry`] if the position is out of range
    /// or its record has disappeared from the store.
    pub fn entry_at(&self, position: usize) -> Result<Entry, StarError> {
        let key = self
            .store
            .read_list_range(&self.list_key, position, position)?
            .into_iter()
            .next()
            .ok_or_else(|| StarError::MissingEntry {
                key: format!("{}[{position}]", self.list_key),
            })?;
        self.read_entry(&key)
    }

    /// Reads the entries at positions `from..=to`, in ascending order.
    pub(crate) fn entries_between(&self, from: usize, to: usize) -> Result<Vec<Entry>, StarError> {
        self.store
            .read_list_range(&self.list_key, from, to)?
            .iter()
            .map(|key| self.read_entry(key))
            .collect()
    }

    fn read_entry(&self, key: &str) -> Result<Entry, StarError> {
        self.store
            .get_entry(key)?
            .ok_or_else(|| StarError::MissingEntry {
                key: key.to_string(),
            })
    }

    /// Deletes every entry record listed by this index, then the list.
    ///
    /// Records that are already gone are skipped. Calling `close` more than
    /// once is harmless. Afterwards range queries fail with
    /// [`StarError::IndexNotFound`] and listings are empty.
    pub fn close(&self) -> Result<(), StarError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        *self.range_slot()? = None;

        let keys = self
            .store
            .read_list_range(&self.list_key, 0, self.length)?;
        if keys.len() != self.length {
            tracing::warn!(
                list = %self.list_key,
                expected = self.length,
                found = keys.len(),
                "ranked index list length differs from recorded length"
            );
        }
        for key in &keys {
            self.store.delete_entry(key)?;
        }
        self.store.delete_list(&self.list_key)?;

        tracing::debug!(
            session = %self.session_key,
            attribute = %self.attribute,
            "closed ranked index"
        );
        Ok(())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), StarError> {
        if self.is_closed() {
            return Err(StarError::IndexNotFound {
                session_key: self.session_key.clone(),
                attribute: self.attribute,
            });
        }
        Ok(())
    }

    pub(crate) fn range_slot(&self) -> Result<MutexGuard<'_, Option<RangeResult>>, StarError> {
        self.last_range.lock().map_err(|e| StarError::Internal {
            message: format!("range cache lock poisoned: {e}"),
        })
    }
}

/// One record key per entry, unique within the index.
fn record_keys(
    session_key: &str,
    attribute: Attribute,
    entries: &[(u64, Entry)],
) -> Result<Vec<String>, StarError> {
    let mut taken = HashSet::with_capacity(entries.len());
    let mut keys = Vec::with_capacity(entries.len());
    for (star_id, entry) in entries {
        let mut key = entry_key(session_key, attribute, &entry.name);
        if taken.contains(&key) {
            key = star_entry_key(session_key, attribute, &entry.name, *star_id);
            tracing::debug!(name = %entry.name, star_id, "display name already indexed");
        }
        if !taken.insert(key.clone()) {
            return Err(StarError::DuplicateEntry { key });
        }
        keys.push(key);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_core::{CatalogAssociation, CatalogNames, CatalogTag};
    use star_db::{KeyedStore, MemoryStore};
    use std::sync::Arc;

    fn hip_names(ids: impl IntoIterator<Item = u64>) -> CatalogNames {
        CatalogNames::from_associations(ids.into_iter().map(|id| CatalogAssociation {
            star_id: id,
            catalog_tag: CatalogTag::Hip,
            identifier: id.to_string(),
        }))
    }

    fn dist_star(id: u64, dist: f64) -> Star {
        Star::new(id, dist, 0.0, 0.0)
    }

    #[test]
    fn build_sorts_ascending_and_stable() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 5.0), dist_star(2, 3.0), dist_star(3, 5.0)];
        let index = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &hip_names(1..=3),
            store.clone(),
        )
        .unwrap();

        assert_eq!(index.len(), 3);
        let names: Vec<String> = (0..3).map(|i| index.entry_at(i).unwrap().name).collect();
        assert_eq!(names, vec!["HIP 2", "HIP 1", "HIP 3"]);
        assert_eq!(store.list_len("s:dist").unwrap(), 3);
        assert_eq!(
            store.get_entry("s:dist:HIP 2").unwrap(),
            Some(Entry::new("HIP 2", 3.0))
        );
    }

    #[test]
    fn build_uses_selected_attribute() {
        let store = MemoryStore::shared();
        let stars = vec![Star::new(1, 1.0, 9.0, 0.0), Star::new(2, 2.0, -1.0, 0.0)];
        let index =
            RankedIndex::build("s", Attribute::Magnitude, &stars, &hip_names([1, 2]), store)
                .unwrap();
        assert_eq!(index.entry_at(0).unwrap(), Entry::new("HIP 2", -1.0));
        assert_eq!(index.entry_at(1).unwrap(), Entry::new("HIP 1", 9.0));
    }

    #[test]
    fn unresolved_name_aborts_without_writes() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 1.0), dist_star(99, 2.0)];
        let err = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &hip_names([1]),
            store.clone(),
        )
        .unwrap_err();

        assert_eq!(err, StarError::UnresolvedName { star_id: 99 });
        assert!(store.is_empty());
    }

    fn twin_names() -> CatalogNames {
        let proper = |star_id: u64| CatalogAssociation {
            star_id,
            catalog_tag: CatalogTag::Proper,
            identifier: "Twin".to_string(),
        };
        let mut names = hip_names([2]);
        names.insert(proper(1));
        names.insert(proper(3));
        names
    }

    #[test]
    fn shared_display_names_keep_separate_records() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 1.0), dist_star(2, 3.0), dist_star(3, 5.0)];
        let index = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &twin_names(),
            store.clone(),
        )
        .unwrap();

        let values: Vec<f64> = (0..3).map(|i| index.entry_at(i).unwrap().value).collect();
        assert_eq!(values, vec![1.0, 3.0, 5.0]);
        assert_eq!(
            store.read_list_range("s:dist", 0, 2).unwrap(),
            vec!["s:dist:Twin", "s:dist:HIP 2", "s:dist:Twin#3"]
        );
        assert_eq!(index.entry_at(2).unwrap(), Entry::new("Twin", 5.0));

        index.close().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn repeated_star_fails_without_writes() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 1.0), dist_star(1, 1.0), dist_star(1, 1.0)];
        let err = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &hip_names([1]),
            store.clone(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            StarError::DuplicateEntry {
                key: "s:dist:HIP 1#1".to_string()
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn close_removes_all_rows_and_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let stars: Vec<Star> = (1..=12).map(|id| dist_star(id, id as f64)).collect();
        let index = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &hip_names(1..=12),
            store.clone(),
        )
        .unwrap();
        assert_eq!(store.entry_count(), 12);

        index.close().unwrap();
        assert!(store.is_empty());
        assert!(index.is_closed());

        index.close().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn close_tolerates_missing_records() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 1.0), dist_star(2, 2.0)];
        let index = RankedIndex::build(
            "s",
            Attribute::Distance,
            &stars,
            &hip_names([1, 2]),
            store.clone(),
        )
        .unwrap();

        store.delete_entry("s:dist:HIP 1").unwrap();
        index.close().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn close_leaves_other_sessions_alone() {
        let store = Arc::new(MemoryStore::new());
        let stars = vec![dist_star(1, 1.0)];
        let names = hip_names([1]);
        let a = RankedIndex::build("a", Attribute::Distance, &stars, &names, store.clone())
            .unwrap();
        let b = RankedIndex::build("b", Attribute::Distance, &stars, &names, store.clone())
            .unwrap();

        a.close().unwrap();
        assert_eq!(store.entry_count(), 1);
        assert_eq!(b.entry_at(0).unwrap().name, "HIP 1");
    }

    #[test]
    fn entry_at_out_of_range_is_missing() {
        let index = RankedIndex::build(
            "s",
            Attribute::Distance,
            &[dist_star(1, 1.0)],
            &hip_names([1]),
            MemoryStore::shared(),
        )
        .unwrap();
        assert!(matches!(
            index.entry_at(1),
            Err(StarError::MissingEntry { .. })
        ));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let index = RankedIndex::build_with_page_size(
            "s",
            Attribute::Distance,
            &[],
            &hip_names([]),
            MemoryStore::shared(),
            0,
        )
        .unwrap();
        assert_eq!(index.page_size(), 1);
        assert!(index.is_empty());
    }
}
