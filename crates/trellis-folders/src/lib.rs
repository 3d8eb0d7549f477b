//! # Trellis Folders
//!
//! This crate provides the folder hierarchy for the Trellis platform,
//! shared by the authorization engine and the API services.
//!
//! ## Overview
//!
//! Folders are containers for domain objects and the base perimeter for
//! role assignments. They form a single tree:
//!
//! ```text
//! Root (global)
//!   ├─ Domain "Corporate"
//!   │     ├─ Domain "Subsidiary"
//!   │     └─ Enclave "Third parties"
//!   └─ Domain "R&D"
//! ```
//!
//! Exactly one folder has [`FolderKind::Root`]. Every other folder has
//! exactly one parent, and cycles are rejected at insert time, so tree
//! walks always terminate.
//!
//! ## Usage
//!
//! ```rust
//! use trellis_folders::{Folder, FolderTree};
//!
//! let mut tree = FolderTree::new();
//! let root = Folder::root("Global");
//! let root_id = root.id;
//! tree.insert(root).unwrap();
//!
//! let domain = Folder::domain("Corporate", root_id);
//! let domain_id = domain.id;
//! tree.insert(domain).unwrap();
//!
//! assert_eq!(tree.root().unwrap().id, root_id);
//! assert_eq!(tree.descendants(root_id).count(), 1);
//! assert_eq!(tree.ancestors(domain_id).next().unwrap().id, root_id);
//! ```

pub mod error;
pub mod folder;
pub mod tree;

// Re-export main types for convenience
pub use error::{TreeError, TreeResult};
pub use folder::{Folder, FolderKind};
pub use tree::{Ancestors, Descendants, FolderTree};
