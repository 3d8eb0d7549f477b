//! # Trellis IAM
//!
//! Folder-scoped authorization engine for the Trellis platform: given a
//! principal, a permission token and a target folder, decide whether
//! access is allowed, and enumerate everything a user can reach.
//!
//! ## Overview
//!
//! The trellis-iam crate handles:
//! - **Principals**: users and user groups, with group-inherited grants
//! - **Role assignments**: principal + role + perimeter + recursive flag
//! - **Resource location**: deriving the owning folder of any object
//! - **Access evaluation**: the single yes/no decision
//! - **Accessible sets**: bulk enumeration of folders and objects
//! - **Domain provisioning**: builtin groups and assignments per domain
//!
//! ## Architecture
//!
//! ```text
//! User ──┬─ RoleAssignment ─→ Role ─→ PermissionSet
//!        │        └─ perimeter: {Folder, ...} + is_recursive
//!        └─ UserGroup ─ RoleAssignment ─→ ...
//!
//! is_access_allowed(principal, token, folder)
//!   └─ walks folder → ... → root against each assignment's perimeter
//! accessible_objects(folder, user, kind)
//!   └─ expands recursive perimeters, resolves objects per folder,
//!      overlays published ancestors
//! ```
//!
//! ## Recursive-flag semantics
//!
//! The three query families treat `is_recursive` differently, on
//! purpose:
//! - [`evaluator::is_access_allowed`] ignores it: ancestor perimeters
//!   always cover their subtree;
//! - [`index::accessible_folders`] expands perimeters to descendants
//!   unconditionally;
//! - [`index::accessible_objects`] expands only recursive perimeters.
//!
//! Changing any one of them silently changes authorization outcomes.
//!
//! ## Usage
//!
//! ```rust
//! use trellis_folders::Folder;
//! use trellis_iam::{evaluator, provision_domain, MemoryDirectory, Principal, User};
//! use trellis_rbac::{KindRegistry, PermissionToken};
//!
//! let mut dir = MemoryDirectory::with_builtin_roles(KindRegistry::builtin()).unwrap();
//! let root = Folder::root("Global");
//! let root_id = root.id;
//! dir.create_folder(root).unwrap();
//! let domain = dir.create_folder(Folder::domain("Corp", root_id)).unwrap();
//!
//! let provisioned = provision_domain(&mut dir, domain).unwrap();
//! let (_, readers) = provisioned.groups[0];
//! let user = dir
//!     .add_user(User::new("ada@example.com", root_id).with_group(readers))
//!     .unwrap();
//!
//! assert!(evaluator::is_access_allowed(
//!     &dir,
//!     &Principal::User(user),
//!     &PermissionToken::view_folder(),
//!     domain,
//! ));
//! ```

pub mod assignment;
pub mod directory;
pub mod error;
pub mod evaluator;
pub mod index;
pub mod locator;
pub mod objects;
pub mod principal;
pub mod provision;
pub mod resolver;

// Re-export main types for convenience
pub use assignment::RoleAssignment;
pub use directory::{Directory, MemoryDirectory};
pub use error::{IamError, IamResult};
pub use index::{
    accessible_folders, accessible_objects, permissions_per_folder, viewable_folders,
    AccessibleObjects,
};
pub use locator::{Resource, ResourceLocator};
pub use objects::{ObjectRecord, ResourceCatalog};
pub use principal::{Principal, User, UserGroup};
pub use provision::{provision_domain, ProvisionedDomain};
