//! # star-search
//!
//! Per-session ranked indices over star attributes.
//!
//! A [`RankedIndex`] is a sorted, store-backed sequence of
//! [`star_core::Entry`] values for one `(session key, attribute)` pair. It
//! answers two kinds of queries:
//!
//! - [`RankedIndex::range_query`]: the tightest run of entries whose values
//!   fall inside `[minimum, maximum]`, cached on the handle;
//! - [`RankedIndex::list_page`]: one page of the cached run, ascending or
//!   descending.
//!
//! Handles are owned by an [`IndexRegistry`], which guarantees one live
//! handle per pair and tears every attribute down together on eviction.
//!
//! ## Usage
//!
//! ```
//! use star_core::{Attribute, CatalogAssociation, CatalogNames, CatalogTag, Star};
//! use star_db::MemoryStore;
//! use star_search::IndexRegistry;
//!
//! let names = CatalogNames::from_associations((1..=3).map(|id| CatalogAssociation {
//!     star_id: id,
//!     catalog_tag: CatalogTag::Hip,
//!     identifier: id.to_string(),
//! }));
//! let stars = vec![
//!     Star::new(1, 5.0, 0.0, 0.0),
//!     Star::new(2, 3.0, 0.0, 0.0),
//!     Star::new(3, 5.0, 0.0, 0.0),
//! ];
//!
//! let registry = IndexRegistry::new(MemoryStore::shared());
//! let index = registry
//!     .get_or_create("session", Attribute::Distance, Some(&stars[..]), &names)
//!     .unwrap();
//!
//! let summary = index.range_query(4.0, 5.0).unwrap();
//! assert_eq!(summary.sum(), Some(2));
//!
//! let page = index.list_page(1, true).unwrap();
//! assert_eq!(page[0].name, "HIP 3");
//!
//! registry.evict("session").unwrap();
//! ```
//!
//! ## Architecture Rules
//!
//! - Depends on `star-core` and `star-db`.
//! - No async code; every operation runs to completion synchronously.
//! - Store rows are released only by [`RankedIndex::close`], which the
//!   registry calls on eviction.

pub mod index;
pub mod page;
pub mod range;
pub mod registry;

pub use index::RankedIndex;
pub use range::{RangeResult, RangeSummary};
pub use registry::IndexRegistry;

pub use star_core;
pub use star_db;
