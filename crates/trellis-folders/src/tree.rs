//! Folder tree arena
//!
//! The tree stores folders in an arena indexed by id, with parent
//! back-references on the folders and a children index for traversal.
//! Ancestor and descendant walks are index lookups, not pointer chasing.
//!
//! Structural invariants (single root, single parent, no cycles) are
//! enforced by [`FolderTree::insert`]; read operations assume them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TreeError, TreeResult};
use crate::folder::{Folder, FolderKind};

/// Arena of folders forming a single tree.
///
/// Read operations (`root`, `descendants`, `ancestors`, `full_path`) take
/// `&self` and never mutate, so a shared tree can serve any number of
/// concurrent readers.
///
/// # Examples
///
/// ```
/// use trellis_folders::{Folder, FolderTree};
///
/// let mut tree = FolderTree::new();
/// let root = Folder::root("Global");
/// let root_id = root.id;
/// tree.insert(root).unwrap();
///
/// let a = Folder::domain("A", root_id);
/// let a_id = a.id;
/// tree.insert(a).unwrap();
/// let b = Folder::domain("B", a_id);
/// let b_id = b.id;
/// tree.insert(b).unwrap();
///
/// let under_root: Vec<_> = tree.descendants(root_id).map(|f| f.id).collect();
/// assert_eq!(under_root, vec![a_id, b_id]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderTree {
    /// Folders by id.
    folders: HashMap<Uuid, Folder>,
    /// Children ids per folder, in insertion order.
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl FolderTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            folders: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Insert a folder, validating the tree invariants.
    ///
    /// # Errors
    ///
    /// - [`TreeError::DuplicateFolder`] if the id is already present
    /// - [`TreeError::RootHasParent`] if a root folder carries a parent
    /// - [`TreeError::MultipleRoots`] if a root folder already exists
    /// - [`TreeError::MissingParent`] if a non-root folder has no parent
    /// - [`TreeError::UnknownParent`] if the parent is not in the tree
    pub fn insert(&mut self, folder: Folder) -> TreeResult<()> {
        if self.folders.contains_key(&folder.id) {
            return Err(TreeError::DuplicateFolder(folder.id));
        }
        match (folder.kind, folder.parent) {
            (FolderKind::Root, Some(_)) => return Err(TreeError::RootHasParent(folder.id)),
            (FolderKind::Root, None) => {
                if self.folders.values().any(Folder::is_root) {
                    return Err(TreeError::MultipleRoots(2));
                }
            }
            (_, None) => return Err(TreeError::MissingParent(folder.id)),
            (_, Some(parent)) => {
                if !self.folders.contains_key(&parent) {
                    return Err(TreeError::UnknownParent(parent));
                }
            }
        }
        if let Some(parent) = folder.parent {
            self.children.entry(parent).or_default().push(folder.id);
        }
        self.folders.insert(folder.id, folder);
        Ok(())
    }

    /// Remove a childless folder.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownFolder`] if the folder is not in the tree
    /// - [`TreeError::HasChildren`] if the folder still has children
    pub fn remove(&mut self, id: Uuid) -> TreeResult<Folder> {
        if !self.folders.contains_key(&id) {
            return Err(TreeError::UnknownFolder(id));
        }
        if !self.children_of(id).is_empty() {
            return Err(TreeError::HasChildren(id));
        }
        let folder = self
            .folders
            .remove(&id)
            .ok_or(TreeError::UnknownFolder(id))?;
        if let Some(parent) = folder.parent {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != id);
            }
        }
        self.children.remove(&id);
        Ok(folder)
    }

    /// Get the root folder.
    ///
    /// Scans for the folder with [`FolderKind::Root`] so that a store
    /// violating the single-root invariant fails loudly instead of
    /// silently picking one.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NoRoot`] if no root folder exists
    /// - [`TreeError::MultipleRoots`] if more than one is observed
    pub fn root(&self) -> TreeResult<&Folder> {
        let mut roots = self.folders.values().filter(|f| f.is_root());
        let first = roots.next().ok_or(TreeError::NoRoot)?;
        let extra = roots.count();
        if extra > 0 {
            return Err(TreeError::MultipleRoots(extra + 1));
        }
        Ok(first)
    }

    /// Get a folder by id.
    pub fn get(&self, id: Uuid) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Check if the tree contains a folder.
    pub fn contains(&self, id: Uuid) -> bool {
        self.folders.contains_key(&id)
    }

    /// Direct children ids of a folder, in insertion order.
    pub fn children_of(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lazy depth-first walk over every folder transitively under `id`.
    ///
    /// Excludes `id` itself. Each call returns a fresh iterator, so the
    /// walk is restartable. Unknown ids yield an empty walk.
    pub fn descendants(&self, id: Uuid) -> Descendants<'_> {
        let mut stack: Vec<Uuid> = self.children_of(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Lazy walk over `id`'s parent, grandparent, … up to and including
    /// the root. Excludes `id` itself. Unknown ids yield an empty walk.
    pub fn ancestors(&self, id: Uuid) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.folders.get(&id).and_then(|f| f.parent),
        }
    }

    /// Ordered path from the root down to `id`.
    ///
    /// With `include_root = false` the root is dropped from the front,
    /// except when `id` IS the root, where the path stays `[root]`.
    /// Unknown ids yield an empty path.
    pub fn full_path(&self, id: Uuid, include_root: bool) -> Vec<&Folder> {
        let Some(folder) = self.folders.get(&id) else {
            return Vec::new();
        };
        let mut path: Vec<&Folder> = vec![folder];
        path.extend(self.ancestors(id));
        path.reverse();
        if !include_root && path.len() > 1 {
            path.remove(0);
        }
        path
    }

    /// Iterate over every folder in the tree, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    /// Number of folders in the tree.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Depth-first iterator over a folder's descendants.
///
/// Created by [`FolderTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a FolderTree,
    stack: Vec<Uuid>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Folder;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        for child in self.tree.children_of(id).iter().rev() {
            self.stack.push(*child);
        }
        self.tree.get(id)
    }
}

/// Iterator over a folder's ancestors, root last.
///
/// Created by [`FolderTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a FolderTree,
    next: Option<Uuid>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Folder;

    fn next(&mut self) -> Option<Self::Item> {
        let folder = self.tree.get(self.next?)?;
        self.next = folder.parent;
        Some(folder)
    }
}
