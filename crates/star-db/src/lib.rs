//! # star-db
//!
//! Keyed storage backing the ranked star indices.
//!
//! ## Layout
//!
//! A ranked index for `(session, attribute)` occupies:
//!
//! - one ordered list under [`list_key`] (`"<session>:<attribute>"`) holding
//!   entry keys in ascending value order;
//! - one entry record per star under [`entry_key`]
//!   (`"<session>:<attribute>:<name>"`); a star whose display name is
//!   already used in the same index is stored under [`star_entry_key`]
//!   (`"<session>:<attribute>:<name>#<star id>"`).
//!
//! ## Usage
//!
//! ```
//! use star_db::{KeyedStore, MemoryStore, entry_key, list_key};
//! use star_core::{Attribute, Entry};
//!
//! let store = MemoryStore::new();
//! let list = list_key("s1", Attribute::Distance);
//! let key = entry_key("s1", Attribute::Distance, "Sirius");
//!
//! store.set_entry(&key, &Entry::new("Sirius", 2.64)).unwrap();
//! store.append_to_list(&list, &key).unwrap();
//!
//! assert_eq!(store.read_list_range(&list, 0, 0).unwrap(), vec![key.clone()]);
//! assert_eq!(store.get_entry(&key).unwrap().unwrap().value, 2.64);
//! ```
//!
//! ## Architecture Rules
//!
//! - Depends only on `star-core`.
//! - Every store operation is individually atomic; there are no
//!   multi-operation transactions.

mod store;

pub use star_core;
pub use store::{entry_key, list_key, star_entry_key, KeyedStore, MemoryStore, SharedStore};
