//! Error types for folder tree operations
//!
//! All structural invariants of the tree are enforced at write time, so
//! these errors surface either on mutation or when `root()` observes a
//! store that violates the single-root invariant.

use thiserror::Error;
use uuid::Uuid;

/// Folder tree error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// No folder with the root kind exists.
    #[error("No root folder exists")]
    NoRoot,

    /// More than one root folder was observed.
    ///
    /// `insert` rejects a second root, so this can only be observed on a
    /// tree reconstructed from an inconsistent store.
    #[error("Observed {0} root folders, expected exactly one")]
    MultipleRoots(usize),

    /// The referenced folder does not exist.
    #[error("Unknown folder: {0}")]
    UnknownFolder(Uuid),

    /// The referenced parent folder does not exist.
    #[error("Unknown parent folder: {0}")]
    UnknownParent(Uuid),

    /// A non-root folder was inserted without a parent.
    #[error("Folder {0} has no parent and is not the root")]
    MissingParent(Uuid),

    /// A root folder was inserted with a parent reference.
    #[error("Root folder {0} must not have a parent")]
    RootHasParent(Uuid),

    /// A folder with this id already exists.
    #[error("Duplicate folder: {0}")]
    DuplicateFolder(Uuid),

    /// The folder still has children and cannot be removed.
    #[error("Folder {0} has children")]
    HasChildren(Uuid),
}

/// Result type for folder tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
