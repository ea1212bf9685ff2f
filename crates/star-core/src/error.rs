//! Error type shared by every crate in the workspace.

use thiserror::Error;

use crate::star::Attribute;

/// Errors produced by the star search engine.
///
/// # Example
///
/// ```
/// use star_core::StarError;
///
/// let err = StarError::UnresolvedName { star_id: 7 };
/// assert!(err.to_string().contains("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StarError {
    /// The backing store failed or its lock was poisoned.
    #[error("storage error: {message}")]
    StorageError { message: String },

    /// A star has no association in any recognized catalog.
    #[error("star {star_id} has no designation in any known catalog")]
    UnresolvedName { star_id: u64 },

    /// A handle was requested before it was ever built.
    #[error("no ranked index for session {session_key:?} and attribute {attribute}")]
    IndexNotFound {
        session_key: String,
        attribute: Attribute,
    },

    /// Two entries of one ranked index would share a record key.
    #[error("entry record {key:?} would be written twice in one index")]
    DuplicateEntry { key: String },

    /// A key listed in a ranked index has no entry record.
    #[error("entry record {key:?} is missing from the store")]
    MissingEntry { key: String },

    /// An attribute name outside the `dist`/`mag`/`absmag` vocabulary.
    #[error("unknown attribute: {value:?}")]
    InvalidAttribute { value: String },

    /// A catalog tag outside the known designation catalogs.
    #[error("unknown catalog tag: {value:?}")]
    InvalidCatalogTag { value: String },

    /// The star catalog could not be loaded.
    #[error("catalog error: {message}")]
    CatalogError { message: String },

    /// Anything else.
    #[error("internal error: {message}")]
    Internal { message: String },
}
