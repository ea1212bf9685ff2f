//! IndexRegistry: one live [`RankedIndex`] per `(session key, attribute)`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use star_core::{Attribute, NameResolver, Star, StarError, PAGE_SIZE};
use star_db::SharedStore;

use crate::index::RankedIndex;

type HandleKey = (String, Attribute);

/// Holds the handle once built. Its mutex serializes builds of one pair.
type Slot = Arc<Mutex<Option<Arc<RankedIndex>>>>;
type SlotMap = HashMap<HandleKey, Slot>;

/// Owns every live ranked index and the store they write to.
///
/// The registry is an explicit object: the application creates one and
/// passes it to whatever needs it. Entries are added on first
/// construction and removed only by [`IndexRegistry::evict`]; nothing
/// expires on its own.
///
/// Each `(session key, attribute)` pair has its own slot. The map lock is
/// held only to find, insert, or remove a slot, so building one index
/// never blocks lookups of other pairs. Nothing waits on a slot while
/// holding the map lock.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use star_core::{Attribute, CatalogAssociation, CatalogNames, CatalogTag, Star};
/// use star_db::MemoryStore;
/// use star_search::IndexRegistry;
///
/// let names = CatalogNames::from_associations([CatalogAssociation {
///     star_id: 1,
///     catalog_tag: CatalogTag::Proper,
///     identifier: "Vega".into(),
/// }]);
/// let stars = [Star::new(1, 7.7, 0.03, 0.58)];
/// let registry = IndexRegistry::new(MemoryStore::shared());
///
/// let first = registry
///     .get_or_create("s", Attribute::Magnitude, Some(&stars[..]), &names)
///     .unwrap();
/// let again = registry.get("s", Attribute::Magnitude).unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
///
/// assert_eq!(registry.evict("s").unwrap(), 1);
/// assert!(registry.get("s", Attribute::Magnitude).is_err());
/// ```
pub struct IndexRegistry {
    store: SharedStore,
    page_size: usize,
    slots: RwLock<SlotMap>,
}

impl std::fmt::Debug for IndexRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("page_size", &self.page_size)
            .field("handles", &self.len())
            .finish()
    }
}

impl IndexRegistry {
    /// Creates an empty registry whose indices page by [`PAGE_SIZE`].
    pub fn new(store: SharedStore) -> Self {
        Self::with_page_size(store, PAGE_SIZE)
    }

    /// Creates an empty registry with a custom page size (0 is treated as 1).
    pub fn with_page_size(store: SharedStore, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// The store every index in this registry writes to.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the live handle for the pair.
    ///
    /// Waits if the same pair is being built right now.
    ///
    /// # Errors
    ///
    /// Returns [`StarError::IndexNotFound`] if no index was built for it.
    pub fn get(
        &self,
        session_key: &str,
        attribute: Attribute,
    ) -> Result<Arc<RankedIndex>, StarError> {
        let slot = self
            .read_slots()?
            .get(&(session_key.to_string(), attribute))
            .cloned();
        let handle = match slot {
            Some(slot) => lock_slot(&slot)?.clone(),
            None => None,
        };
        handle.ok_or_else(|| StarError::IndexNotFound {
            session_key: session_key.to_string(),
            attribute,
        })
    }

    /// Returns the live handle for the pair, building it from `stars` if
    /// none exists.
    ///
    /// When a handle already exists `stars` is ignored and the same
    /// `Arc` is returned. Without a handle and without `stars` the call
    /// fails instead of building an empty index. Concurrent calls for one
    /// pair build it once; the others wait and receive the same handle.
    ///
    /// # Errors
    ///
    /// - [`StarError::IndexNotFound`] if nothing is registered and `stars`
    ///   is `None`.
    /// - Any error from [`RankedIndex::build`]; nothing is registered then.
    pub fn get_or_create(
        &self,
        session_key: &str,
        attribute: Attribute,
        stars: Option<&[Star]>,
        resolver: &dyn NameResolver,
    ) -> Result<Arc<RankedIndex>, StarError> {
        let Some(stars) = stars else {
            return self.get(session_key, attribute);
        };

        let key = (session_key.to_string(), attribute);
        loop {
            let slot = self.slot_for(&key)?;
            let mut handle = lock_slot(&slot)?;
            if let Some(index) = handle.as_ref() {
                return Ok(Arc::clone(index));
            }
            // dropped by a failed build or an eviction while we waited
            if !self.is_current(&key, &slot)? {
                continue;
            }

            return match RankedIndex::build_with_page_size(
                session_key,
                attribute,
                stars,
                resolver,
                Arc::clone(&self.store),
                self.page_size,
            ) {
                Ok(index) => {
                    let index = Arc::new(index);
                    *handle = Some(Arc::clone(&index));
                    Ok(index)
                }
                Err(e) => {
                    drop(handle);
                    self.discard_empty_slot(&key, &slot)?;
                    Err(e)
                }
            };
        }
    }

    /// Builds (or fetches) the index of every [`Attribute`] for a session.
    ///
    /// Stops at the first failing attribute; attributes built before the
    /// failure stay registered so a later [`IndexRegistry::evict`] releases
    /// them.
    pub fn build_all(
        &self,
        session_key: &str,
        stars: &[Star],
        resolver: &dyn NameResolver,
    ) -> Result<Vec<Arc<RankedIndex>>, StarError> {
        Attribute::ALL
            .into_iter()
            .map(|attribute| self.get_or_create(session_key, attribute, Some(stars), resolver))
            .collect()
    }

    /// Removes and closes the indices of every attribute of a session.
    ///
    /// Missing attributes are skipped. A build of the session still in
    /// progress is waited for and then closed. Every removed index is
    /// closed even if an earlier one fails; the first failure is returned.
    ///
    /// Returns the number of indices removed.
    pub fn evict(&self, session_key: &str) -> Result<usize, StarError> {
        let removed: Vec<Slot> = {
            let mut slots = self.write_slots()?;
            Attribute::ALL
                .into_iter()
                .filter_map(|attribute| slots.remove(&(session_key.to_string(), attribute)))
                .collect()
        };

        let mut first_error = None;
        let mut count = 0;
        for slot in &removed {
            let index = match lock_slot(slot) {
                Ok(mut handle) => handle.take(),
                Err(e) => {
                    first_error.get_or_insert(e);
                    continue;
                }
            };
            let Some(index) = index else { continue };
            count += 1;
            if let Err(e) = index.close() {
                tracing::warn!(
                    session = session_key,
                    attribute = %index.attribute(),
                    "failed to close ranked index: {e}"
                );
                first_error.get_or_insert(e);
            }
        }

        if count > 0 {
            tracing::debug!(session = session_key, count, "evicted session");
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }

    /// Whether a handle is registered for the pair.
    pub fn contains(&self, session_key: &str, attribute: Attribute) -> bool {
        self.get(session_key, attribute).is_ok()
    }

    /// Number of live handles across all sessions. Builds still in
    /// progress are not counted.
    pub fn len(&self) -> usize {
        self.read_slots()
            .map(|slots| {
                slots
                    .values()
                    .filter(|slot| matches!(slot.try_lock(), Ok(handle) if handle.is_some()))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slot for `key`, inserting an empty one if needed.
    fn slot_for(&self, key: &HandleKey) -> Result<Slot, StarError> {
        if let Some(slot) = self.read_slots()?.get(key) {
            return Ok(Arc::clone(slot));
        }
        Ok(Arc::clone(self.write_slots()?.entry(key.clone()).or_default()))
    }

    fn is_current(&self, key: &HandleKey, slot: &Slot) -> Result<bool, StarError> {
        Ok(self
            .read_slots()?
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot)))
    }

    /// Drops the slot of a failed build unless another caller has since
    /// filled it or is building into it.
    fn discard_empty_slot(&self, key: &HandleKey, slot: &Slot) -> Result<(), StarError> {
        let mut slots = self.write_slots()?;
        let unused = match slots.get(key) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                matches!(slot.try_lock(), Ok(handle) if handle.is_none())
            }
            _ => false,
        };
        if unused {
            slots.remove(key);
        }
        Ok(())
    }

    fn read_slots(&self) -> Result<RwLockReadGuard<'_, SlotMap>, StarError> {
        self.slots.read().map_err(|e| StarError::Internal {
            message: format!("failed to acquire registry read lock: {e}"),
        })
    }

    fn write_slots(&self) -> Result<RwLockWriteGuard<'_, SlotMap>, StarError> {
        self.slots.write().map_err(|e| StarError::Internal {
            message: format!("failed to acquire registry write lock: {e}"),
        })
    }
}

fn lock_slot(slot: &Slot) -> Result<MutexGuard<'_, Option<Arc<RankedIndex>>>, StarError> {
    slot.lock().map_err(|e| StarError::Internal {
        message: format!("index slot lock poisoned: {e}"),
    })
}
