//! Error types for the authorization engine
//!
//! Access decisions never produce errors: absence of permission is
//! `false` or an empty set. These errors cover store commands, object
//! location and provisioning.

use thiserror::Error;
use trellis_folders::TreeError;
use trellis_rbac::RbacError;
use uuid::Uuid;

/// Authorization engine error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IamError {
    /// A folder tree invariant was violated.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A permission model invariant was violated.
    #[error(transparent)]
    Rbac(#[from] RbacError),

    /// Every location path was exhausted without finding an owning folder.
    ///
    /// Callers should treat the object as not locatable, typically
    /// surfaced as not-found.
    #[error("No owning folder found for object {0}")]
    NoFolder(Uuid),

    /// A resource kind with no registered folder-location rule.
    #[error("Unsupported resource kind: {0}")]
    UnsupportedResourceKind(String),

    /// A role assignment binding both or neither of user and group.
    #[error("Role assignment must bind exactly one of user or group")]
    InvalidAssignment,

    /// The referenced user does not exist.
    #[error("Unknown user: {0}")]
    UnknownUser(Uuid),

    /// The referenced user group does not exist.
    #[error("Unknown user group: {0}")]
    UnknownGroup(Uuid),

    /// The referenced role does not exist.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// The referenced folder does not exist.
    #[error("Unknown folder: {0}")]
    UnknownFolder(Uuid),

    /// The referenced object does not exist in the catalog.
    #[error("Unknown object: {0}")]
    UnknownObject(Uuid),

    /// Provisioning was requested on a folder that is not a domain.
    #[error("Folder {0} is not a domain")]
    NotADomain(Uuid),

    /// The domain already carries its builtin groups.
    #[error("Domain {0} is already provisioned")]
    AlreadyProvisioned(Uuid),
}

/// Result type for authorization engine operations.
pub type IamResult<T> = Result<T, IamError>;
