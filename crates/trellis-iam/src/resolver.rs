//! Permission resolver
//!
//! Aggregates a principal's effective role assignments: its own, plus,
//! for users, the assignments of every group the user belongs to. The
//! union is deduplicated by assignment id, so repeated references
//! contribute no duplicate effect.

use std::collections::{HashMap, HashSet};

use trellis_rbac::PermissionToken;
use uuid::Uuid;

use crate::assignment::RoleAssignment;
use crate::directory::Directory;
use crate::principal::Principal;

/// Every role assignment reaching a principal, directly or through
/// group membership. Deduplicated, direct assignments first.
pub fn role_assignments<'a, D>(dir: &'a D, principal: &Principal) -> Vec<&'a RoleAssignment>
where
    D: Directory + ?Sized,
{
    let all: Vec<&RoleAssignment> = dir.assignments().collect();
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut result: Vec<&RoleAssignment> = Vec::new();

    for &ra in &all {
        if ra.principal == *principal && seen.insert(ra.id) {
            result.push(ra);
        }
    }
    if let Principal::User(user_id) = principal {
        if let Some(user) = dir.user(*user_id) {
            for &ra in &all {
                if let Principal::Group(group) = ra.principal {
                    if user.in_group(group) && seen.insert(ra.id) {
                        result.push(ra);
                    }
                }
            }
        }
    }
    result
}

/// Every permission token reaching a principal, mapped to the ids of
/// the assignments contributing it.
pub fn permissions<D>(dir: &D, principal: &Principal) -> HashMap<PermissionToken, Vec<Uuid>>
where
    D: Directory + ?Sized,
{
    let mut result: HashMap<PermissionToken, Vec<Uuid>> = HashMap::new();
    for ra in role_assignments(dir, principal) {
        let Some(role) = dir.role(ra.role) else {
            continue;
        };
        for token in role.permissions.tokens() {
            let sources = result.entry(token).or_default();
            if !sources.contains(&ra.id) {
                sources.push(ra.id);
            }
        }
    }
    result
}

/// Check whether any assignment gives the principal the role.
pub fn has_role<D>(dir: &D, principal: &Principal, role: Uuid) -> bool
where
    D: Directory + ?Sized,
{
    role_assignments(dir, principal).iter().any(|ra| ra.role == role)
}

/// Names of the roles reaching the principal, deduplicated.
pub fn roles_of<D>(dir: &D, principal: &Principal) -> Vec<String>
where
    D: Directory + ?Sized,
{
    let mut names: Vec<String> = Vec::new();
    for ra in role_assignments(dir, principal) {
        if let Some(role) = dir.role(ra.role) {
            if !names.contains(&role.name) {
                names.push(role.name.clone());
            }
        }
    }
    names
}

/// Check whether the principal holds any write token anywhere.
pub fn is_editor<D>(dir: &D, principal: &Principal) -> bool
where
    D: Directory + ?Sized,
{
    permissions(dir, principal)
        .keys()
        .any(|token| token.verb.is_write())
}
