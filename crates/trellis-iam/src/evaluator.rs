//! Access evaluator
//!
//! The single-decision check: does this principal hold this permission
//! on this folder. Decisions never error; anything unknown or
//! unreachable evaluates to a denial.

use trellis_rbac::PermissionToken;
use uuid::Uuid;

use crate::directory::Directory;
use crate::locator::{Resource, ResourceLocator};
use crate::objects::ResourceCatalog;
use crate::principal::Principal;
use crate::resolver;

/// Decide whether `principal` holds `token` on `folder`.
///
/// The walk starts at `folder` and climbs to the root: an assignment
/// whose perimeter contains any ancestor covers the whole subtree
/// underneath it, independent of `is_recursive`; only the bulk
/// enumeration queries consult that flag.
///
/// The tagging token is the one global escape hatch: a principal
/// holding it in any assignment may tag objects anywhere.
///
/// # Examples
///
/// ```
/// use trellis_iam::{evaluator, MemoryDirectory, Principal};
/// use trellis_rbac::{KindRegistry, PermissionToken};
///
/// let dir = MemoryDirectory::new(KindRegistry::builtin());
/// let nobody = Principal::User(uuid::Uuid::now_v7());
/// let anywhere = uuid::Uuid::now_v7();
/// assert!(!evaluator::is_access_allowed(
///     &dir,
///     &nobody,
///     &PermissionToken::view_folder(),
///     anywhere,
/// ));
/// ```
pub fn is_access_allowed<D>(
    dir: &D,
    principal: &Principal,
    token: &PermissionToken,
    folder: Uuid,
) -> bool
where
    D: Directory + ?Sized,
{
    let tree = dir.tree();
    let tagging = PermissionToken::tagging();
    for ra in resolver::role_assignments(dir, principal) {
        let Some(role) = dir.role(ra.role) else {
            continue;
        };
        if !role.has(token) {
            continue;
        }
        if *token == tagging {
            return true;
        }
        let mut current = Some(folder);
        while let Some(id) = current {
            if ra.perimeter.contains(&id) {
                return true;
            }
            current = tree.get(id).and_then(|f| f.parent);
        }
    }
    false
}

/// Decide whether `principal` may view the catalog object `object`.
///
/// Resolves the object's owning folder through the forward location
/// protocol and evaluates `view_<kind>` there. Unlocatable or unknown
/// objects read as `false`.
pub fn is_object_readable<D>(
    dir: &D,
    catalog: &ResourceCatalog,
    locator: &ResourceLocator,
    principal: &Principal,
    object: Uuid,
) -> bool
where
    D: Directory + ?Sized,
{
    let Some(record) = catalog.get(object) else {
        return false;
    };
    let Ok(folder) = locator.locate(dir.tree(), catalog, Resource::Object(record)) else {
        return false;
    };
    let token = PermissionToken::view(record.kind.clone());
    is_access_allowed(dir, principal, &token, folder)
}
