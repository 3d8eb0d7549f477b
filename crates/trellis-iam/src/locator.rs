//! Resource locator
//!
//! The forward half of the polymorphic location protocol: derive the
//! owning folder of an arbitrary domain object by trying a fixed,
//! ordered table of reference paths. The first path yielding a folder
//! that exists in the tree wins.
//!
//! The inverse half (objects of a kind located in a folder) lives on
//! [`ResourceCatalog::objects_in`](crate::ResourceCatalog::objects_in),
//! driven by the kind registry.

use serde::{Deserialize, Serialize};
use trellis_folders::{Folder, FolderTree};
use uuid::Uuid;

use crate::error::{IamError, IamResult};
use crate::objects::{ObjectRecord, ResourceCatalog};

/// Anything the locator can resolve: a folder is its own location, any
/// other object resolves through the path table.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A folder; resolves to itself.
    Folder(&'a Folder),
    /// Any other domain object.
    Object(&'a ObjectRecord),
}

/// Ordered table of reference paths resolving an object to its folder.
///
/// Every segment but the last names an object link to follow; the last
/// names a folder reference on the object reached. New resource kinds
/// register a path without touching any evaluator logic.
///
/// # Examples
///
/// ```
/// use trellis_iam::ResourceLocator;
///
/// let mut locator = ResourceLocator::new();
/// // an incident reaches its folder through its perimeter
/// locator.register_path(["incident_perimeter", "folder"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLocator {
    paths: Vec<Vec<String>>,
}

impl ResourceLocator {
    /// Create a locator holding the builtin path table, in priority
    /// order.
    pub fn new() -> Self {
        let builtin: &[&[&str]] = &[
            &["folder"],
            &["parent_folder"],
            &["perimeter", "folder"],
            &["entity", "folder"],
            &["provider_entity", "folder"],
            &["solution", "provider_entity", "folder"],
            &["risk_assessment", "perimeter", "folder"],
            &["risk_scenario", "risk_assessment", "perimeter", "folder"],
            &["compliance_assessment", "perimeter", "folder"],
        ];
        Self {
            paths: builtin
                .iter()
                .map(|path| path.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    /// Append a path to the table.
    pub fn register_path<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.push(path.into_iter().map(Into::into).collect());
    }

    /// Resolve the owning folder of a resource.
    ///
    /// # Errors
    ///
    /// [`IamError::NoFolder`] when every path is exhausted without a
    /// folder that exists in the tree.
    pub fn locate(
        &self,
        tree: &FolderTree,
        catalog: &ResourceCatalog,
        resource: Resource<'_>,
    ) -> IamResult<Uuid> {
        let record = match resource {
            Resource::Folder(folder) => return Ok(folder.id),
            Resource::Object(record) => record,
        };
        for path in &self.paths {
            if let Some(folder) = Self::walk(catalog, record, path) {
                if tree.contains(folder) {
                    return Ok(folder);
                }
            }
        }
        Err(IamError::NoFolder(record.id))
    }

    /// Resolve the owning folder of a catalog object by id.
    ///
    /// # Errors
    ///
    /// [`IamError::UnknownObject`] if the id is not in the catalog,
    /// otherwise as [`ResourceLocator::locate`].
    pub fn locate_object(
        &self,
        tree: &FolderTree,
        catalog: &ResourceCatalog,
        id: Uuid,
    ) -> IamResult<Uuid> {
        let record = catalog.get(id).ok_or(IamError::UnknownObject(id))?;
        self.locate(tree, catalog, Resource::Object(record))
    }

    fn walk(catalog: &ResourceCatalog, record: &ObjectRecord, path: &[String]) -> Option<Uuid> {
        let (folder_ref, links) = path.split_last()?;
        let mut current = record;
        for link in links {
            current = catalog.get(current.link(link)?)?;
        }
        current.folder_ref(folder_ref)
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self::new()
    }
}
