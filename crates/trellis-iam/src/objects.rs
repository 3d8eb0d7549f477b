//! Domain object records
//!
//! The engine never sees concrete domain types. The service layer
//! presents each object as a record: a kind, named folder references and
//! named links to other objects. The catalog pairs those records with
//! the kind registry describing how each kind is located in a folder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_folders::FolderTree;
use trellis_rbac::{KindRegistry, KindSpec, LocationRule, ResourceKind};
use uuid::Uuid;

use crate::error::{IamError, IamResult};

/// A domain object as seen by the authorization engine.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_iam::ObjectRecord;
/// use trellis_rbac::ResourceKind;
///
/// let folder_id = Uuid::now_v7();
/// let kind = ResourceKind::new("evidence").unwrap();
/// let record = ObjectRecord::new(kind).in_folder(folder_id);
/// assert_eq!(record.folder_ref("folder"), Some(folder_id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Unique identifier for the object
    pub id: Uuid,

    /// The object's resource kind
    pub kind: ResourceKind,

    /// Named folder references (`folder`, `parent_folder`, …)
    #[serde(default)]
    pub folders: HashMap<String, Uuid>,

    /// Named links to other objects (`perimeter`, `risk_assessment`, …)
    #[serde(default)]
    pub links: HashMap<String, Uuid>,

    /// Publication flag; published objects are visible to viewers of
    /// descendant domains (enclaves excepted)
    pub is_published: bool,
}

impl ObjectRecord {
    /// Creates a new record of the given kind with no references.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            folders: HashMap::new(),
            links: HashMap::new(),
            is_published: false,
        }
    }

    /// Set the direct `folder` reference.
    pub fn in_folder(self, folder: Uuid) -> Self {
        self.with_folder_ref("folder", folder)
    }

    /// Add a named folder reference.
    pub fn with_folder_ref(mut self, name: impl Into<String>, folder: Uuid) -> Self {
        self.folders.insert(name.into(), folder);
        self
    }

    /// Add a named link to another object.
    pub fn with_link(mut self, name: impl Into<String>, object: Uuid) -> Self {
        self.links.insert(name.into(), object);
        self
    }

    /// Mark the object as published.
    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Get a named folder reference.
    pub fn folder_ref(&self, name: &str) -> Option<Uuid> {
        self.folders.get(name).copied()
    }

    /// Get a named object link.
    pub fn link(&self, name: &str) -> Option<Uuid> {
        self.links.get(name).copied()
    }
}

/// The object catalog: kind registry plus object records.
///
/// Owned by the collaborator defining the domain objects; the engine
/// reads it for the inverse location protocol and the publication
/// overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCatalog {
    kinds: KindRegistry,
    objects: HashMap<Uuid, ObjectRecord>,
}

impl ResourceCatalog {
    /// Create a catalog over a kind registry.
    pub fn new(kinds: KindRegistry) -> Self {
        Self {
            kinds,
            objects: HashMap::new(),
        }
    }

    /// The kind registry.
    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Register a new kind.
    pub fn register_kind(&mut self, kind: ResourceKind, spec: KindSpec) {
        self.kinds.register(kind, spec);
    }

    /// Insert an object record.
    ///
    /// A publishable object whose direct folder is the root is published
    /// automatically: everything at the root is global content.
    ///
    /// # Errors
    ///
    /// [`IamError::UnsupportedResourceKind`] if the record's kind is not
    /// registered.
    pub fn insert(&mut self, mut record: ObjectRecord, tree: &FolderTree) -> IamResult<Uuid> {
        let spec = self
            .kinds
            .spec(&record.kind)
            .ok_or_else(|| IamError::UnsupportedResourceKind(record.kind.to_string()))?;
        if spec.publishable && !record.is_published {
            let at_root = tree
                .root()
                .map(|root| record.folder_ref("folder") == Some(root.id))
                .unwrap_or(false);
            if at_root {
                debug!(object = %record.id, kind = %record.kind, "publishing root object");
                record.is_published = true;
            }
        }
        let id = record.id;
        self.objects.insert(id, record);
        Ok(id)
    }

    /// Remove an object record.
    pub fn remove(&mut self, id: Uuid) -> Option<ObjectRecord> {
        self.objects.remove(&id)
    }

    /// Get an object record by id.
    pub fn get(&self, id: Uuid) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    /// Iterate over all records of a kind.
    pub fn objects_of_kind<'a>(
        &'a self,
        kind: &'a ResourceKind,
    ) -> impl Iterator<Item = &'a ObjectRecord> {
        self.objects.values().filter(move |o| o.kind == *kind)
    }

    /// Inverse location protocol: ids of the objects of `kind` located
    /// in `folder`.
    ///
    /// Dispatches on the kind's [`LocationRule`]: the direct `folder`
    /// reference, one intermediate link whose target carries the direct
    /// reference, or the folder's own id when the kind IS folder.
    ///
    /// # Errors
    ///
    /// [`IamError::UnsupportedResourceKind`] if the kind has no
    /// registered rule.
    pub fn objects_in(&self, kind: &ResourceKind, folder: Uuid) -> IamResult<Vec<Uuid>> {
        let spec = self
            .kinds
            .spec(kind)
            .ok_or_else(|| IamError::UnsupportedResourceKind(kind.to_string()))?;
        Ok(match &spec.location {
            LocationRule::SelfFolder => vec![folder],
            LocationRule::Direct => self
                .objects_of_kind(kind)
                .filter(|o| o.folder_ref("folder") == Some(folder))
                .map(|o| o.id)
                .collect(),
            LocationRule::Via(link) => self
                .objects_of_kind(kind)
                .filter(|o| {
                    o.link(link)
                        .and_then(|target| self.objects.get(&target))
                        .and_then(|target| target.folder_ref("folder"))
                        == Some(folder)
                })
                .map(|o| o.id)
                .collect(),
        })
    }

    /// Ids of the published objects of `kind` carrying a direct `folder`
    /// reference to `folder`.
    pub fn published_in(&self, kind: &ResourceKind, folder: Uuid) -> Vec<Uuid> {
        self.objects_of_kind(kind)
            .filter(|o| o.is_published && o.folder_ref("folder") == Some(folder))
            .map(|o| o.id)
            .collect()
    }

    /// Number of object records.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_folders::Folder;

    fn kind(name: &str) -> ResourceKind {
        ResourceKind::new(name).unwrap()
    }

    fn tree_with_domain() -> (FolderTree, Uuid, Uuid) {
        let mut tree = FolderTree::new();
        let root = Folder::root("Global");
        let root_id = root.id;
        tree.insert(root).unwrap();
        let domain = Folder::domain("Corp", root_id);
        let domain_id = domain.id;
        tree.insert(domain).unwrap();
        (tree, root_id, domain_id)
    }

    #[test]
    fn test_insert_rejects_unknown_kind() {
        let (tree, ..) = tree_with_domain();
        let mut catalog = ResourceCatalog::new(KindRegistry::builtin());
        let record = ObjectRecord::new(kind("starship"));
        assert_eq!(
            catalog.insert(record, &tree).unwrap_err(),
            IamError::UnsupportedResourceKind("starship".to_string())
        );
    }

    #[test]
    fn test_insert_publishes_root_objects() {
        let (tree, root_id, domain_id) = tree_with_domain();
        let mut catalog = ResourceCatalog::new(KindRegistry::builtin());

        let global = catalog
            .insert(ObjectRecord::new(kind("threat")).in_folder(root_id), &tree)
            .unwrap();
        assert!(catalog.get(global).unwrap().is_published);

        let local = catalog
            .insert(ObjectRecord::new(kind("threat")).in_folder(domain_id), &tree)
            .unwrap();
        assert!(!catalog.get(local).unwrap().is_published);

        // non-publishable kinds stay unpublished even at the root
        let evidence = catalog
            .insert(ObjectRecord::new(kind("evidence")).in_folder(root_id), &tree)
            .unwrap();
        assert!(!catalog.get(evidence).unwrap().is_published);
    }

    #[test]
    fn test_objects_in_direct() {
        let (tree, _, domain_id) = tree_with_domain();
        let mut catalog = ResourceCatalog::new(KindRegistry::builtin());
        let id = catalog
            .insert(
                ObjectRecord::new(kind("evidence")).in_folder(domain_id),
                &tree,
            )
            .unwrap();

        assert_eq!(
            catalog.objects_in(&kind("evidence"), domain_id).unwrap(),
            vec![id]
        );
        assert!(catalog
            .objects_in(&kind("evidence"), Uuid::now_v7())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_objects_in_via_intermediate() {
        let (tree, _, domain_id) = tree_with_domain();
        let mut catalog = ResourceCatalog::new(KindRegistry::builtin());

        let assessment = catalog
            .insert(
                ObjectRecord::new(kind("risk_assessment")).in_folder(domain_id),
                &tree,
            )
            .unwrap();
        let scenario = catalog
            .insert(
                ObjectRecord::new(kind("risk_scenario")).with_link("risk_assessment", assessment),
                &tree,
            )
            .unwrap();

        assert_eq!(
            catalog.objects_in(&kind("risk_scenario"), domain_id).unwrap(),
            vec![scenario]
        );
    }

    #[test]
    fn test_objects_in_self_folder() {
        let (tree, _, domain_id) = tree_with_domain();
        let catalog = ResourceCatalog::new(KindRegistry::builtin());
        assert_eq!(
            catalog.objects_in(&ResourceKind::folder(), domain_id).unwrap(),
            vec![domain_id]
        );
    }

    #[test]
    fn test_objects_in_unknown_kind() {
        let catalog = ResourceCatalog::new(KindRegistry::builtin());
        assert_eq!(
            catalog.objects_in(&kind("starship"), Uuid::now_v7()),
            Err(IamError::UnsupportedResourceKind("starship".to_string()))
        );
    }

    #[test]
    fn test_published_in() {
        let (tree, root_id, domain_id) = tree_with_domain();
        let mut catalog = ResourceCatalog::new(KindRegistry::builtin());
        let published = catalog
            .insert(ObjectRecord::new(kind("threat")).in_folder(root_id), &tree)
            .unwrap();
        catalog
            .insert(ObjectRecord::new(kind("threat")).in_folder(domain_id), &tree)
            .unwrap();

        assert_eq!(catalog.published_in(&kind("threat"), root_id), vec![published]);
        assert!(catalog.published_in(&kind("threat"), domain_id).is_empty());
    }
}
