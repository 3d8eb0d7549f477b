//! # Trellis RBAC (Role-Based Access Control)
//!
//! This crate provides the permission model for the Trellis platform:
//! resource kinds, permission tokens, permission sets and roles.
//!
//! ## Overview
//!
//! The trellis-rbac crate handles:
//! - **Resource kinds**: categories of domain objects, with a registry
//!   describing how each kind is located in the folder hierarchy
//! - **Verbs**: operations that can be performed on resource kinds
//! - **Permission tokens**: verb + kind combinations
//! - **Roles**: named sets of tokens, with a validating catalog
//!
//! ## Architecture
//!
//! ```text
//! PermissionToken = Verb + ResourceKind
//!
//! Examples:
//!   "view_folder"              - View a folder
//!   "change_risk_assessment"   - Modify a risk assessment
//!   "add_tag"                  - Tag objects (global escape hatch)
//! ```
//!
//! Roles are plain token sets: there is no wildcard matching and no
//! verb implication. Where a token is granted is decided entirely by the
//! role assignments evaluated in `trellis-iam`; this crate only says
//! *what* a role grants.
//!
//! ## Usage
//!
//! ```rust
//! use trellis_rbac::{KindRegistry, PermissionToken, Role, RoleCatalog};
//!
//! let kinds = KindRegistry::builtin();
//! let mut catalog = RoleCatalog::with_builtins(&kinds).unwrap();
//!
//! // a custom role, validated against the kind registry
//! let role = Role::new("tagger").grant(PermissionToken::tagging());
//! let role_id = catalog.insert(role, &kinds).unwrap();
//! assert!(catalog.get(role_id).unwrap().has(&PermissionToken::tagging()));
//! ```

pub mod error;
pub mod permissions;
pub mod resources;
pub mod roles;
pub mod verbs;

// Re-export main types for convenience
pub use error::{RbacError, RbacResult};
pub use permissions::{PermissionSet, PermissionToken};
pub use resources::{KindRegistry, KindSpec, LocationRule, ResourceKind};
pub use roles::{BuiltinRole, Role, RoleCatalog};
pub use verbs::Verb;
