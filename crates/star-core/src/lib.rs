//! # star-core
//!
//! Shared types for the star ranked-search engine.
//!
//! - [`Star`]: one catalog star with its indexable numeric fields
//! - [`Attribute`]: the three numeric fields a ranked index is built over
//! - [`Entry`]: one `(name, value)` pair stored in a ranked index
//! - [`StarError`]: the error type used across every crate
//! - [`catalog`]: catalog designations and the display-name resolver
//! - [`geometry`]: sky-polygon validation and containment
//! - [`sky`]: in-memory star catalog, selection, and statistics
//!
//! ## Architecture Rules
//!
//! - No dependencies on other `star-*` crates.
//! - No async code, no network code.

pub mod catalog;
pub mod error;
pub mod geometry;
pub mod sky;
pub mod star;

pub use catalog::{CatalogAssociation, CatalogNames, CatalogTag, NameResolver};
pub use error::StarError;
pub use star::{Attribute, Entry, Star};

/// Number of entries returned by one page of a listing.
pub const PAGE_SIZE: usize = 10;
