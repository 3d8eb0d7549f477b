//! Domain provisioner
//!
//! Bootstraps a freshly created domain folder with its four builtin
//! user groups and the recursive role assignments binding each group to
//! its builtin role. Every reference is validated before anything is
//! written, so a failing call leaves zero artifacts behind.

use tracing::info;
use trellis_folders::FolderKind;
use trellis_rbac::BuiltinRole;
use uuid::Uuid;

use crate::assignment::RoleAssignment;
use crate::directory::{Directory, MemoryDirectory};
use crate::error::{IamError, IamResult};
use crate::principal::{Principal, UserGroup};

/// What [`provision_domain`] created.
#[derive(Debug, Clone)]
pub struct ProvisionedDomain {
    /// The provisioned domain folder.
    pub folder: Uuid,
    /// Builtin group ids, one per builtin role, in provisioning order.
    pub groups: Vec<(BuiltinRole, Uuid)>,
    /// Builtin assignment ids, in the same order.
    pub assignments: Vec<Uuid>,
}

/// Provision a domain folder with its builtin groups and assignments.
///
/// Creates one builtin [`UserGroup`] per [`BuiltinRole`], scoped to the
/// domain, and one builtin recursive [`RoleAssignment`] per group,
/// owned by the root folder, perimeter narrowed to the domain.
///
/// All-or-nothing: the folder, the root and all four builtin roles are
/// resolved up front; only then is anything inserted.
///
/// # Errors
///
/// - [`IamError::UnknownFolder`] if the folder is absent
/// - [`IamError::NotADomain`] for root or enclave folders
/// - [`IamError::AlreadyProvisioned`] if builtin groups already exist
/// - [`IamError::Tree`] if the root cannot be resolved
/// - [`IamError::UnknownRole`] if a builtin role is missing from the
///   catalog
///
/// # Examples
///
/// ```
/// use trellis_folders::Folder;
/// use trellis_iam::{provision_domain, MemoryDirectory};
/// use trellis_rbac::KindRegistry;
///
/// let mut dir = MemoryDirectory::with_builtin_roles(KindRegistry::builtin()).unwrap();
/// let root = Folder::root("Global");
/// let root_id = root.id;
/// dir.create_folder(root).unwrap();
/// let domain = dir.create_folder(Folder::domain("Corp", root_id)).unwrap();
///
/// let provisioned = provision_domain(&mut dir, domain).unwrap();
/// assert_eq!(provisioned.groups.len(), 4);
/// assert_eq!(provisioned.assignments.len(), 4);
/// ```
pub fn provision_domain(dir: &mut MemoryDirectory, folder: Uuid) -> IamResult<ProvisionedDomain> {
    let target = dir
        .tree()
        .get(folder)
        .ok_or(IamError::UnknownFolder(folder))?;
    if target.kind != FolderKind::Domain {
        return Err(IamError::NotADomain(folder));
    }
    let root = dir.tree().root()?.id;
    if dir
        .groups()
        .any(|g| g.builtin && g.folder == folder && BuiltinRole::parse(&g.name).is_some())
    {
        return Err(IamError::AlreadyProvisioned(folder));
    }

    // resolve every builtin role before creating anything
    let mut bindings: Vec<(BuiltinRole, Uuid)> = Vec::new();
    for builtin in BuiltinRole::all() {
        let role = dir
            .roles()
            .find_by_name(builtin.as_str())
            .ok_or_else(|| IamError::UnknownRole(builtin.as_str().to_string()))?;
        bindings.push((builtin, role.id));
    }

    // stage the whole batch, then land it; nothing above mutated state
    let mut provisioned = ProvisionedDomain {
        folder,
        groups: Vec::new(),
        assignments: Vec::new(),
    };
    for (builtin, role_id) in bindings {
        let group = UserGroup::new(builtin.as_str(), folder).as_builtin();
        let assignment = RoleAssignment::new(Principal::Group(group.id), role_id, root)
            .with_perimeter(folder)
            .recursive()
            .as_builtin();
        provisioned.groups.push((builtin, group.id));
        provisioned.assignments.push(assignment.id);
        dir.insert_group_unchecked(group);
        dir.insert_assignment_unchecked(assignment);
    }

    info!(domain = %folder, "provisioned domain builtin groups and assignments");
    Ok(provisioned)
}
