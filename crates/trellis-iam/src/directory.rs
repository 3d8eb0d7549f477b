//! Directory store
//!
//! The engine reads committed state through the [`Directory`] query
//! trait: an explicit handle passed to every query, never a global.
//! [`MemoryDirectory`] is the in-process implementation; persistence
//! adapters materialize the same interface from their own schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_folders::{Folder, FolderTree};
use trellis_rbac::{KindRegistry, Role, RoleCatalog};
use uuid::Uuid;

use crate::assignment::RoleAssignment;
use crate::error::{IamError, IamResult};
use crate::principal::{Principal, User, UserGroup};

/// Read-only query interface over committed authorization state.
///
/// All engine queries are pure functions of a `&dyn Directory` (or any
/// `D: Directory`): they acquire no locks and mutate nothing, so a
/// shared store can serve arbitrarily many concurrent readers.
pub trait Directory: Send + Sync {
    /// The folder tree.
    fn tree(&self) -> &FolderTree;

    /// Look up a user by id.
    fn user(&self, id: Uuid) -> Option<&User>;

    /// Look up a user group by id.
    fn group(&self, id: Uuid) -> Option<&UserGroup>;

    /// Look up a role by id.
    fn role(&self, id: Uuid) -> Option<&Role>;

    /// Iterate over every role assignment.
    fn assignments(&self) -> Box<dyn Iterator<Item = &RoleAssignment> + '_>;
}

/// In-memory directory store.
///
/// Commands validate fully before touching state, so a failed command
/// leaves the store unchanged and readers never observe partial writes.
///
/// # Examples
///
/// ```
/// use trellis_folders::Folder;
/// use trellis_iam::{MemoryDirectory, User};
/// use trellis_rbac::KindRegistry;
///
/// let mut dir = MemoryDirectory::new(KindRegistry::builtin());
/// let root = Folder::root("Global");
/// let root_id = root.id;
/// dir.create_folder(root).unwrap();
/// dir.add_user(User::new("ada@example.com", root_id)).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDirectory {
    kinds: KindRegistry,
    tree: FolderTree,
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, UserGroup>,
    roles: RoleCatalog,
    assignments: HashMap<Uuid, RoleAssignment>,
}

impl MemoryDirectory {
    /// Create an empty directory over a kind registry.
    pub fn new(kinds: KindRegistry) -> Self {
        Self {
            kinds,
            tree: FolderTree::new(),
            users: HashMap::new(),
            groups: HashMap::new(),
            roles: RoleCatalog::new(),
            assignments: HashMap::new(),
        }
    }

    /// Create a directory seeded with the four builtin roles.
    pub fn with_builtin_roles(kinds: KindRegistry) -> IamResult<Self> {
        let roles = RoleCatalog::with_builtins(&kinds)?;
        let mut dir = Self::new(kinds);
        dir.roles = roles;
        Ok(dir)
    }

    /// The kind registry.
    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// The role catalog.
    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    /// Iterate over every user group.
    pub fn groups(&self) -> impl Iterator<Item = &UserGroup> {
        self.groups.values()
    }

    /// Iterate over every user.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Insert a folder into the tree.
    pub fn create_folder(&mut self, folder: Folder) -> IamResult<Uuid> {
        let id = folder.id;
        self.tree.insert(folder)?;
        debug!(folder = %id, "folder created");
        Ok(id)
    }

    /// Remove a childless folder from the tree.
    pub fn remove_folder(&mut self, id: Uuid) -> IamResult<Folder> {
        let folder = self.tree.remove(id)?;
        debug!(folder = %id, "folder removed");
        Ok(folder)
    }

    /// Add a user.
    ///
    /// # Errors
    ///
    /// [`IamError::UnknownFolder`] if the owning folder is absent;
    /// [`IamError::UnknownGroup`] if any group membership is dangling.
    pub fn add_user(&mut self, user: User) -> IamResult<Uuid> {
        if !self.tree.contains(user.folder) {
            return Err(IamError::UnknownFolder(user.folder));
        }
        for group in &user.groups {
            if !self.groups.contains_key(group) {
                return Err(IamError::UnknownGroup(*group));
            }
        }
        let id = user.id;
        self.users.insert(id, user);
        debug!(user = %id, "user added");
        Ok(id)
    }

    /// Add a user group.
    ///
    /// # Errors
    ///
    /// [`IamError::UnknownFolder`] if the scoping folder is absent.
    pub fn add_group(&mut self, group: UserGroup) -> IamResult<Uuid> {
        if !self.tree.contains(group.folder) {
            return Err(IamError::UnknownFolder(group.folder));
        }
        let id = group.id;
        self.groups.insert(id, group);
        debug!(group = %id, "user group added");
        Ok(id)
    }

    /// Put a user into a group.
    pub fn add_user_to_group(&mut self, user: Uuid, group: Uuid) -> IamResult<()> {
        if !self.groups.contains_key(&group) {
            return Err(IamError::UnknownGroup(group));
        }
        let user = self
            .users
            .get_mut(&user)
            .ok_or(IamError::UnknownUser(user))?;
        user.groups.insert(group);
        Ok(())
    }

    /// Add a role through the validating catalog.
    pub fn add_role(&mut self, role: Role) -> IamResult<Uuid> {
        Ok(self.roles.insert(role, &self.kinds)?)
    }

    /// Add a role assignment.
    ///
    /// # Errors
    ///
    /// - [`IamError::UnknownRole`] if the role id is not in the catalog
    /// - [`IamError::UnknownUser`]/[`IamError::UnknownGroup`] if the
    ///   principal is dangling
    /// - [`IamError::UnknownFolder`] if the owning folder or any
    ///   perimeter folder is absent
    pub fn add_assignment(&mut self, assignment: RoleAssignment) -> IamResult<Uuid> {
        if self.roles.get(assignment.role).is_none() {
            return Err(IamError::UnknownRole(assignment.role.to_string()));
        }
        match assignment.principal {
            Principal::User(id) if !self.users.contains_key(&id) => {
                return Err(IamError::UnknownUser(id))
            }
            Principal::Group(id) if !self.groups.contains_key(&id) => {
                return Err(IamError::UnknownGroup(id))
            }
            _ => {}
        }
        if !self.tree.contains(assignment.folder) {
            return Err(IamError::UnknownFolder(assignment.folder));
        }
        for folder in &assignment.perimeter {
            if !self.tree.contains(*folder) {
                return Err(IamError::UnknownFolder(*folder));
            }
        }
        let id = assignment.id;
        debug!(assignment = %id, role = %assignment.role, "role assignment added");
        self.assignments.insert(id, assignment);
        Ok(id)
    }

    /// Remove a role assignment.
    ///
    /// Builtin assignments are conventionally protected from deletion;
    /// enforcing that convention is the administrative layer's call, not
    /// this store's.
    pub fn remove_assignment(&mut self, id: Uuid) -> Option<RoleAssignment> {
        self.assignments.remove(&id)
    }

    /// Look up an assignment by id.
    pub fn assignment(&self, id: Uuid) -> Option<&RoleAssignment> {
        self.assignments.get(&id)
    }

    // Validated-ahead insertions used by the provisioner: callers have
    // already checked every reference, so these cannot fail and the
    // whole batch lands or none of it does.
    pub(crate) fn insert_group_unchecked(&mut self, group: UserGroup) {
        self.groups.insert(group.id, group);
    }

    pub(crate) fn insert_assignment_unchecked(&mut self, assignment: RoleAssignment) {
        self.assignments.insert(assignment.id, assignment);
    }
}

impl Directory for MemoryDirectory {
    fn tree(&self) -> &FolderTree {
        &self.tree
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    fn group(&self, id: Uuid) -> Option<&UserGroup> {
        self.groups.get(&id)
    }

    fn role(&self, id: Uuid) -> Option<&Role> {
        self.roles.get(id)
    }

    fn assignments(&self) -> Box<dyn Iterator<Item = &RoleAssignment> + '_> {
        Box::new(self.assignments.values())
    }
}
