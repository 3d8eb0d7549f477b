//! Error types for the permission model

use thiserror::Error;

/// Permission model error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RbacError {
    /// A resource kind name that is not a valid identifier.
    #[error("Invalid resource kind: {0:?}")]
    InvalidResourceKind(String),

    /// A permission token references a kind absent from the registry.
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// A permission token string that does not parse as `<verb>_<kind>`.
    #[error("Invalid permission token: {0:?}")]
    InvalidToken(String),

    /// A role with this name already exists in the catalog.
    #[error("Duplicate role: {0:?}")]
    DuplicateRole(String),
}

/// Result type for permission model operations.
pub type RbacResult<T> = Result<T, RbacError>;
