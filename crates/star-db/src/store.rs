//! KeyedStore: the six operations a ranked index needs from its backing
//! store, and an in-process implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use star_core::{Attribute, Entry, StarError};

/// Shared handle to a store, cloned into every ranked index.
pub type SharedStore = Arc<dyn KeyedStore>;

/// Key of the ordered list backing the index for `(session_key, attribute)`.
///
/// # Example
///
/// ```
/// use star_db::list_key;
/// use star_core::Attribute;
///
/// assert_eq!(list_key("abc", Attribute::Magnitude), "abc:mag");
/// ```
pub fn list_key(session_key: &str, attribute: Attribute) -> String {
    format!("{session_key}:{attribute}")
}

/// Key of one entry record inside the index for `(session_key, attribute)`.
///
/// # Example
///
/// ```
/// use star_db::entry_key;
/// use star_core::Attribute;
///
/// assert_eq!(entry_key("abc", Attribute::Distance, "HIP 1"), "abc:dist:HIP 1");
/// ```
pub fn entry_key(session_key: &str, attribute: Attribute, name: &str) -> String {
    format!("{session_key}:{attribute}:{name}")
}

/// Key of an entry record whose display name is already taken in the same
/// index: the [`entry_key`] suffixed with `#<star id>`.
///
/// # Example
///
/// ```
/// use star_db::star_entry_key;
/// use star_core::Attribute;
///
/// assert_eq!(star_entry_key("abc", Attribute::Distance, "Twin", 3), "abc:dist:Twin#3");
/// ```
pub fn star_entry_key(
    session_key: &str,
    attribute: Attribute,
    name: &str,
    star_id: u64,
) -> String {
    format!("{}#{star_id}", entry_key(session_key, attribute, name))
}

/// Entry records plus ordered lists of keys.
///
/// Each call is atomic on its own. Implementations must tolerate deletes
/// of keys that do not exist.
pub trait KeyedStore: Send + Sync {
    /// Writes (or overwrites) the entry record under `key`.
    fn set_entry(&self, key: &str, entry: &Entry) -> Result<(), StarError>;

    /// Reads the entry record under `key`, if present.
    fn get_entry(&self, key: &str) -> Result<Option<Entry>, StarError>;

    /// Deletes the entry record under `key`. Returns whether it existed.
    fn delete_entry(&self, key: &str) -> Result<bool, StarError>;

    /// Appends `key` to the list `list_key`, creating the list if needed.
    /// Returns the new list length.
    fn append_to_list(&self, list_key: &str, key: &str) -> Result<usize, StarError>;

    /// Reads list elements at positions `from..=to`.
    ///
    /// `to` is clamped to the last element; a missing list or a `from`
    /// past the end yields an empty vector.
    fn read_list_range(&self, list_key: &str, from: usize, to: usize)
        -> Result<Vec<String>, StarError>;

    /// Number of elements in the list (0 if absent).
    fn list_len(&self, list_key: &str) -> Result<usize, StarError>;

    /// Deletes the list. Returns whether it existed.
    fn delete_list(&self, list_key: &str) -> Result<bool, StarError>;
}

#[derive(Debug, Default)]
struct Tables {
    entries: HashMap<String, Entry>,
    lists: HashMap<String, Vec<String>>,
}

/// In-process [`KeyedStore`] backed by hash maps.
///
/// Every operation takes the internal lock for its own duration only.
///
/// # Example
///
/// ```
/// use star_db::{KeyedStore, MemoryStore};
/// use star_core::Entry;
///
/// let store = MemoryStore::new();
/// store.set_entry("k", &Entry::new("Vega", 0.03)).unwrap();
/// assert!(store.delete_entry("k").unwrap());
/// assert!(!store.delete_entry("k").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store already wrapped for sharing.
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    /// Number of entry records currently stored.
    pub fn entry_count(&self) -> usize {
        self.tables.read().map(|t| t.entries.len()).unwrap_or(0)
    }

    /// Number of lists currently stored.
    pub fn list_count(&self) -> usize {
        self.tables.read().map(|t| t.lists.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no records and no lists.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0 && self.list_count() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StarError> {
        self.tables.read().map_err(|e| StarError::StorageError {
            message: format!("failed to acquire store read lock: {e}"),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StarError> {
        self.tables.write().map_err(|e| StarError::StorageError {
            message: format!("failed to acquire store write lock: {e}"),
        })
    }
}

impl KeyedStore for MemoryStore {
    fn set_entry(&self, key: &str, entry: &Entry) -> Result<(), StarError> {
        self.write()?.entries.insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn get_entry(&self, key: &str) -> Result<Option<Entry>, StarError> {
        Ok(self.read()?.entries.get(key).cloned())
    }

    fn delete_entry(&self, key: &str) -> Result<bool, StarError> {
        Ok(self.write()?.entries.remove(key).is_some())
    }

    fn append_to_list(&self, list_key: &str, key: &str) -> Result<usize, StarError> {
        let mut tables = self.write()?;
        let list = tables.lists.entry(list_key.to_string()).or_default();
        list.push(key.to_string());
        Ok(list.len())
    }

    fn read_list_range(
        &self,
        list_key: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<String>, StarError> {
        let tables = self.read()?;
        let Some(list) = tables.lists.get(list_key) else {
            return Ok(Vec::new());
        };
        if from >= list.len() || from > to {
            return Ok(Vec::new());
        }
        let end = to.min(list.len() - 1);
        Ok(list[from..=end].to_vec())
    }

    fn list_len(&self, list_key: &str) -> Result<usize, StarError> {
        Ok(self.read()?.lists.get(list_key).map_or(0, Vec::len))
    }

    fn delete_list(&self, list_key: &str) -> Result<bool, StarError> {
        let removed = self.write()?.lists.remove(list_key);
        if let Some(list) = &removed {
            tracing::trace!(list = list_key, len = list.len(), "deleted list");
        }
        Ok(removed.is_some())
    }
}
