//! Folder domain model
//!
//! A folder is a container for other folders or any domain object.
//! Folders are the base perimeter for role assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of content a folder holds.
///
/// - **Root**: the single global folder at the top of the tree
/// - **Domain**: a regular perimeter for role assignments
/// - **Enclave**: an isolated sub-domain that does not inherit
///   published-object visibility from its ancestors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    /// The global root folder.
    Root,

    /// A regular domain folder.
    Domain,

    /// An isolated enclave folder.
    Enclave,
}

impl FolderKind {
    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderKind::Root => "root",
            FolderKind::Domain => "domain",
            FolderKind::Enclave => "enclave",
        }
    }

    /// Parse a kind from its string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_folders::FolderKind;
    ///
    /// assert_eq!(FolderKind::parse("domain"), Some(FolderKind::Domain));
    /// assert_eq!(FolderKind::parse("GLOBAL"), Some(FolderKind::Root));
    /// assert_eq!(FolderKind::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "root" | "global" => Some(FolderKind::Root),
            "domain" => Some(FolderKind::Domain),
            "enclave" => Some(FolderKind::Enclave),
            _ => None,
        }
    }
}

impl Default for FolderKind {
    fn default() -> Self {
        FolderKind::Domain
    }
}

/// A folder in the hierarchy.
///
/// Folders form a tree with a single [`FolderKind::Root`] folder at the
/// top. Every non-root folder has exactly one parent. A folder is owned by
/// the [`FolderTree`](crate::FolderTree) and destroyed only when childless.
///
/// # Examples
///
/// ```
/// use trellis_folders::{Folder, FolderKind};
///
/// let root = Folder::root("Global");
/// assert_eq!(root.kind, FolderKind::Root);
/// assert!(root.parent.is_none());
///
/// let domain = Folder::domain("Corporate", root.id).with_description("Main perimeter");
/// assert_eq!(domain.parent, Some(root.id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    /// Unique identifier for the folder
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// What this folder contains
    pub kind: FolderKind,

    /// Parent folder id; `None` only for the root
    pub parent: Option<Uuid>,

    /// Whether this folder was provisioned by the system
    pub builtin: bool,

    /// When the folder was created
    pub created_at: DateTime<Utc>,

    /// When the folder was last updated
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Creates a new folder.
    ///
    /// # Arguments
    ///
    /// * `name` - The folder name
    /// * `kind` - The folder kind
    /// * `parent` - Parent folder id, `None` for the root
    pub fn new(name: impl Into<String>, kind: FolderKind, parent: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            kind,
            parent,
            builtin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates the root folder.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, FolderKind::Root, None)
    }

    /// Creates a domain folder under the given parent.
    pub fn domain(name: impl Into<String>, parent: Uuid) -> Self {
        Self::new(name, FolderKind::Domain, Some(parent))
    }

    /// Creates an enclave folder under the given parent.
    pub fn enclave(name: impl Into<String>, parent: Uuid) -> Self {
        Self::new(name, FolderKind::Enclave, Some(parent))
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the folder as system-provisioned.
    pub fn as_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Check if this is the root folder.
    pub fn is_root(&self) -> bool {
        self.kind == FolderKind::Root
    }
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
