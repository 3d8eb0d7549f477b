//! Accessible-set index
//!
//! Bulk enumeration over a user's grants: which folders are reachable,
//! which objects of a kind can be viewed, changed or deleted, and which
//! tokens apply per folder. These are the only queries that consult
//! `is_recursive`, and they do so in two different ways: folder
//! enumeration expands perimeters unconditionally, object enumeration
//! gates the expansion on the flag. Both behaviors are load-bearing;
//! see DESIGN.md before unifying anything here.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use trellis_folders::FolderKind;
use trellis_rbac::{LocationRule, PermissionSet, PermissionToken, ResourceKind, Verb};
use uuid::Uuid;

use crate::directory::Directory;
use crate::error::IamResult;
use crate::objects::ResourceCatalog;
use crate::principal::Principal;
use crate::resolver;

/// The three id sets returned by [`accessible_objects`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessibleObjects {
    /// Objects the user may view.
    pub view: HashSet<Uuid>,
    /// Objects the user may change.
    pub change: HashSet<Uuid>,
    /// Objects the user may delete.
    pub delete: HashSet<Uuid>,
}

/// Folders under `folder` that `user` can reach with `codename`.
///
/// An assignment qualifies when its role holds both `view_folder` and
/// `codename`. Its whole perimeter and every descendant of every
/// perimeter folder count as candidates; here the expansion is
/// unconditional, `is_recursive` notwithstanding. Candidates are then
/// clipped to `{folder} ∪ descendants(folder)` and optionally filtered
/// by folder kind.
pub fn accessible_folders<D>(
    dir: &D,
    folder: Uuid,
    user: Uuid,
    kind: Option<FolderKind>,
    codename: &PermissionToken,
) -> HashSet<Uuid>
where
    D: Directory + ?Sized,
{
    let tree = dir.tree();
    let view_folder = PermissionToken::view_folder();
    let principal = Principal::User(user);

    let mut candidates: HashSet<Uuid> = HashSet::new();
    for ra in resolver::role_assignments(dir, &principal) {
        let Some(role) = dir.role(ra.role) else {
            continue;
        };
        if !(role.has(&view_folder) && role.has(codename)) {
            continue;
        }
        for f in &ra.perimeter {
            candidates.insert(*f);
            candidates.extend(tree.descendants(*f).map(|d| d.id));
        }
    }

    let mut scope: HashSet<Uuid> = HashSet::from([folder]);
    scope.extend(tree.descendants(folder).map(|d| d.id));

    candidates
        .into_iter()
        .filter(|id| scope.contains(id))
        .filter(|id| match kind {
            Some(kind) => tree.get(*id).map(|f| f.kind == kind).unwrap_or(false),
            None => true,
        })
        .collect()
}

/// [`accessible_folders`] with the default `view_folder` codename.
pub fn viewable_folders<D>(
    dir: &D,
    folder: Uuid,
    user: Uuid,
    kind: Option<FolderKind>,
) -> HashSet<Uuid>
where
    D: Directory + ?Sized,
{
    accessible_folders(dir, folder, user, kind, &PermissionToken::view_folder())
}

/// Objects of `kind` under `folder` that `user` can view, change or
/// delete, plus the publication overlay on the view set.
///
/// Per qualifying assignment (role holds `view_folder`), the perimeter
/// is expanded with descendants only when `is_recursive`, the one
/// place the flag narrows anything. The expanded perimeter is clipped
/// to `{folder} ∪ descendants(folder)`, and each of the three
/// `<verb>_<kind>` tokens the role also holds marks every clipped
/// folder as granting that verb. Granted folders then resolve to object
/// ids through the inverse location protocol.
///
/// Publication overlay: for a publishable kind with a direct folder
/// reference, every folder granting local view (unless it is an
/// enclave) also pulls in the published objects of each of its
/// ancestors. Content published in a parent domain is visible below it;
/// enclaves stay isolated.
///
/// # Errors
///
/// [`IamError::UnsupportedResourceKind`](crate::IamError) when `kind`
/// has no registered location rule and at least one folder was granted;
/// with no grants the result is simply empty.
pub fn accessible_objects<D>(
    dir: &D,
    catalog: &ResourceCatalog,
    folder: Uuid,
    user: Uuid,
    kind: &ResourceKind,
) -> IamResult<AccessibleObjects>
where
    D: Directory + ?Sized,
{
    let tree = dir.tree();
    let tokens = [
        PermissionToken::view(kind.clone()),
        PermissionToken::change(kind.clone()),
        PermissionToken::delete(kind.clone()),
    ];
    let view_folder = PermissionToken::view_folder();
    let principal = Principal::User(user);

    let mut scope: HashSet<Uuid> = HashSet::from([folder]);
    scope.extend(tree.descendants(folder).map(|d| d.id));

    let mut granted: HashMap<Uuid, HashSet<Verb>> = HashMap::new();
    for ra in resolver::role_assignments(dir, &principal) {
        let Some(role) = dir.role(ra.role) else {
            continue;
        };
        if !role.has(&view_folder) {
            continue;
        }
        let mut ra_perimeter: HashSet<Uuid> = ra.perimeter.clone();
        if ra.is_recursive {
            for f in &ra.perimeter {
                ra_perimeter.extend(tree.descendants(*f).map(|d| d.id));
            }
        }
        let targets: Vec<Uuid> = ra_perimeter.intersection(&scope).copied().collect();
        for token in &tokens {
            if role.has(token) {
                for f in &targets {
                    granted.entry(*f).or_default().insert(token.verb);
                }
            }
        }
    }

    let mut result = AccessibleObjects::default();
    for (f, verbs) in &granted {
        let ids = catalog.objects_in(kind, *f)?;
        if verbs.contains(&Verb::View) {
            result.view.extend(ids.iter().copied());
        }
        if verbs.contains(&Verb::Change) {
            result.change.extend(ids.iter().copied());
        }
        if verbs.contains(&Verb::Delete) {
            result.delete.extend(ids.iter().copied());
        }
    }

    let overlaid = catalog
        .kinds()
        .spec(kind)
        .map(|spec| spec.publishable && spec.location == LocationRule::Direct)
        .unwrap_or(false);
    if overlaid {
        for (f, verbs) in &granted {
            if !verbs.contains(&Verb::View) {
                continue;
            }
            if tree.get(*f).map(|x| x.kind) == Some(FolderKind::Enclave) {
                continue;
            }
            for ancestor in tree.ancestors(*f) {
                result.view.extend(catalog.published_in(kind, ancestor.id));
            }
        }
    }

    Ok(result)
}

/// Tokens reaching `principal`, grouped by perimeter folder.
///
/// With `recursive = true`, tokens of recursive assignments are also
/// propagated to every descendant of their perimeter folders.
pub fn permissions_per_folder<D>(
    dir: &D,
    principal: &Principal,
    recursive: bool,
) -> HashMap<Uuid, PermissionSet>
where
    D: Directory + ?Sized,
{
    let tree = dir.tree();
    let mut result: HashMap<Uuid, PermissionSet> = HashMap::new();
    for ra in resolver::role_assignments(dir, principal) {
        let Some(role) = dir.role(ra.role) else {
            continue;
        };
        for f in &ra.perimeter {
            result.entry(*f).or_default().merge(&role.permissions);
            if recursive && ra.is_recursive {
                for d in tree.descendants(*f) {
                    result.entry(d.id).or_default().merge(&role.permissions);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::RoleAssignment;
    use crate::directory::MemoryDirectory;
    use crate::objects::ObjectRecord;
    use crate::principal::User;
    use trellis_folders::Folder;
    use trellis_rbac::{KindRegistry, Role};

    struct Fixture {
        dir: MemoryDirectory,
        catalog: ResourceCatalog,
        root: Uuid,
        domain: Uuid,
        child: Uuid,
        enclave: Uuid,
        sibling: Uuid,
        user: Uuid,
    }

    /// root ── domain ── child
    ///     │         └── enclave
    ///     └── sibling
    fn fixture() -> Fixture {
        let mut dir = MemoryDirectory::with_builtin_roles(KindRegistry::builtin()).unwrap();
        let root = dir.create_folder(Folder::root("Global")).unwrap();
        let domain = dir.create_folder(Folder::domain("Corp", root)).unwrap();
        let child = dir.create_folder(Folder::domain("Sub", domain)).unwrap();
        let enclave = dir.create_folder(Folder::enclave("Vault", domain)).unwrap();
        let sibling = dir.create_folder(Folder::domain("Other", root)).unwrap();
        let user = dir.add_user(User::new("ada@example.com", root)).unwrap();
        let catalog = ResourceCatalog::new(KindRegistry::builtin());
        Fixture {
            dir,
            catalog,
            root,
            domain,
            child,
            enclave,
            sibling,
            user,
        }
    }

    fn kind(name: &str) -> ResourceKind {
        ResourceKind::new(name).unwrap()
    }

    fn grant(fx: &mut Fixture, role_name: &str, perimeter: Uuid, recursive: bool) -> Uuid {
        let role = fx.dir.roles().find_by_name(role_name).unwrap().id;
        let mut ra = RoleAssignment::new(Principal::User(fx.user), role, fx.root)
            .with_perimeter(perimeter);
        if recursive {
            ra = ra.recursive();
        }
        fx.dir.add_assignment(ra).unwrap()
    }

    #[test]
    fn test_accessible_folders_ignores_recursive_flag() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);

        // non-recursive assignment still exposes the whole subtree
        let folders = viewable_folders(&fx.dir, fx.root, fx.user, None);
        assert_eq!(
            folders,
            HashSet::from([fx.domain, fx.child, fx.enclave])
        );
    }

    #[test]
    fn test_accessible_folders_clipped_to_scope() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, true);

        let folders = viewable_folders(&fx.dir, fx.child, fx.user, None);
        assert_eq!(folders, HashSet::from([fx.child]));

        let folders = viewable_folders(&fx.dir, fx.sibling, fx.user, None);
        assert!(folders.is_empty());
    }

    #[test]
    fn test_accessible_folders_kind_filter() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);

        let domains = viewable_folders(&fx.dir, fx.root, fx.user, Some(FolderKind::Domain));
        assert_eq!(domains, HashSet::from([fx.domain, fx.child]));

        let enclaves = viewable_folders(&fx.dir, fx.root, fx.user, Some(FolderKind::Enclave));
        assert_eq!(enclaves, HashSet::from([fx.enclave]));
    }

    #[test]
    fn test_accessible_folders_requires_both_tokens() {
        let mut fx = fixture();
        // a role with view_folder but no delete_folder
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);

        let deletable = accessible_folders(
            &fx.dir,
            fx.root,
            fx.user,
            None,
            &PermissionToken::delete(ResourceKind::folder()),
        );
        assert!(deletable.is_empty());

        // and a role without view_folder exposes nothing at all, even
        // for its own codename
        let role = fx
            .dir
            .add_role(Role::new("blind").grant(PermissionToken::delete(ResourceKind::folder())))
            .unwrap();
        fx.dir
            .add_assignment(
                RoleAssignment::new(Principal::User(fx.user), role, fx.root)
                    .with_perimeter(fx.domain),
            )
            .unwrap();
        let deletable = accessible_folders(
            &fx.dir,
            fx.root,
            fx.user,
            None,
            &PermissionToken::delete(ResourceKind::folder()),
        );
        assert!(deletable.is_empty());
    }

    #[test]
    fn test_accessible_objects_honors_recursive_flag() {
        let mut fx = fixture();
        let evidence = kind("evidence");
        let in_domain = fx
            .catalog
            .insert(
                ObjectRecord::new(evidence.clone()).in_folder(fx.domain),
                fx.dir.tree(),
            )
            .unwrap();
        let in_child = fx
            .catalog
            .insert(
                ObjectRecord::new(evidence.clone()).in_folder(fx.child),
                fx.dir.tree(),
            )
            .unwrap();

        // non-recursive: the descendant object is absent from all three
        // sets, even though is_access_allowed on the child would be true
        let __perim = fx.domain;
        grant(&mut fx, "analyst", __perim, false);
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &evidence).unwrap();
        assert_eq!(result.view, HashSet::from([in_domain]));
        assert_eq!(result.change, HashSet::from([in_domain]));
        assert_eq!(result.delete, HashSet::from([in_domain]));
        assert!(!result.view.contains(&in_child));

        // recursive: the subtree opens up
        let __perim = fx.domain;
        grant(&mut fx, "analyst", __perim, true);
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &evidence).unwrap();
        assert_eq!(result.view, HashSet::from([in_domain, in_child]));
    }

    #[test]
    fn test_accessible_objects_verb_split() {
        let mut fx = fixture();
        let evidence = kind("evidence");
        let id = fx
            .catalog
            .insert(
                ObjectRecord::new(evidence.clone()).in_folder(fx.domain),
                fx.dir.tree(),
            )
            .unwrap();

        // reader: view only
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &evidence).unwrap();
        assert_eq!(result.view, HashSet::from([id]));
        assert!(result.change.is_empty());
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_accessible_objects_folder_kind_resolves_to_ids() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, true);
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &ResourceKind::folder())
                .unwrap();
        assert_eq!(result.view, HashSet::from([fx.domain, fx.child, fx.enclave]));
    }

    #[test]
    fn test_accessible_objects_unknown_kind() {
        let mut fx = fixture();
        let starship = kind("starship");

        // no grants: no folders resolve, so the unknown kind never trips
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &starship).unwrap();
        assert!(result.view.is_empty());

        // with a grant the unsupported kind is fatal to the call
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);
        let err =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &starship).unwrap_err();
        assert_eq!(
            err,
            crate::IamError::UnsupportedResourceKind("starship".to_string())
        );
    }

    #[test]
    fn test_publication_overlay_for_domain_viewer() {
        let mut fx = fixture();
        let threat = kind("threat");
        let published = fx
            .catalog
            .insert(
                ObjectRecord::new(threat.clone()).in_folder(fx.domain).published(),
                fx.dir.tree(),
            )
            .unwrap();
        let unpublished = fx
            .catalog
            .insert(
                ObjectRecord::new(threat.clone()).in_folder(fx.domain),
                fx.dir.tree(),
            )
            .unwrap();

        // viewer on the child domain sees the parent's published object
        let __perim = fx.child;
        grant(&mut fx, "reader", __perim, false);
        let result = accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &threat).unwrap();
        assert!(result.view.contains(&published));
        assert!(!result.view.contains(&unpublished));
        // visibility only: no change or delete sneaks in
        assert!(result.change.is_empty());
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_publication_overlay_skips_enclaves() {
        let mut fx = fixture();
        let threat = kind("threat");
        let published = fx
            .catalog
            .insert(
                ObjectRecord::new(threat.clone()).in_folder(fx.domain).published(),
                fx.dir.tree(),
            )
            .unwrap();

        let __perim = fx.enclave;
        grant(&mut fx, "reader", __perim, false);
        let result = accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &threat).unwrap();
        assert!(!result.view.contains(&published));
    }

    #[test]
    fn test_publication_overlay_requires_publishable_kind() {
        let mut fx = fixture();
        let evidence = kind("evidence");
        // a published record of a non-publishable kind stays invisible
        let record = ObjectRecord::new(evidence.clone())
            .in_folder(fx.domain)
            .published();
        let id = fx.catalog.insert(record, fx.dir.tree()).unwrap();

        let __perim = fx.child;
        grant(&mut fx, "reader", __perim, false);
        let result =
            accessible_objects(&fx.dir, &fx.catalog, fx.root, fx.user, &evidence).unwrap();
        assert!(!result.view.contains(&id));
    }

    #[test]
    fn test_permissions_per_folder() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, true);
        let principal = Principal::User(fx.user);

        let flat = permissions_per_folder(&fx.dir, &principal, false);
        assert!(flat.contains_key(&fx.domain));
        assert!(!flat.contains_key(&fx.child));
        assert!(flat[&fx.domain].contains(&PermissionToken::view_folder()));

        let recursive = permissions_per_folder(&fx.dir, &principal, true);
        assert!(recursive.contains_key(&fx.child));
        assert!(recursive.contains_key(&fx.enclave));
        assert!(recursive[&fx.child].contains(&PermissionToken::view_folder()));
    }

    #[test]
    fn test_permissions_per_folder_non_recursive_assignment() {
        let mut fx = fixture();
        let __perim = fx.domain;
        grant(&mut fx, "reader", __perim, false);
        let principal = Principal::User(fx.user);

        // recursive=true propagates nothing when the assignment itself
        // is not recursive
        let map = permissions_per_folder(&fx.dir, &principal, true);
        assert!(map.contains_key(&fx.domain));
        assert!(!map.contains_key(&fx.child));
    }
}
