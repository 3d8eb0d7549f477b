//! Role assignment domain model
//!
//! The fundamental binding of the authorization model: one principal,
//! one role, a perimeter of folders, and a recursive flag consumed by
//! the bulk-enumeration queries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IamError, IamResult};
use crate::principal::{Principal, User};

/// A role assignment.
///
/// Binds exactly one principal to exactly one role over a perimeter of
/// folders. `is_recursive` widens the grant to perimeter descendants in
/// the bulk-enumeration queries only; the single-decision evaluator has
/// its own ancestor-walk semantics and ignores the flag.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_iam::{Principal, RoleAssignment};
///
/// let user_id = Uuid::now_v7();
/// let role_id = Uuid::now_v7();
/// let root_id = Uuid::now_v7();
/// let domain_id = Uuid::now_v7();
///
/// let ra = RoleAssignment::new(Principal::User(user_id), role_id, root_id)
///     .with_perimeter(domain_id)
///     .recursive();
/// assert!(ra.perimeter.contains(&domain_id));
/// assert!(ra.is_recursive);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Unique identifier for the assignment
    pub id: Uuid,

    /// The principal the role is assigned to
    pub principal: Principal,

    /// The assigned role, by id
    pub role: Uuid,

    /// Owning folder of the assignment record itself
    pub folder: Uuid,

    /// The folders this assignment applies to
    #[serde(default)]
    pub perimeter: HashSet<Uuid>,

    /// Whether the grant propagates to perimeter descendants in the
    /// bulk-enumeration queries
    pub is_recursive: bool,

    /// Whether this assignment was provisioned by the system
    pub builtin: bool,

    /// When the assignment was created
    pub created_at: DateTime<Utc>,

    /// When the assignment was last updated
    pub updated_at: DateTime<Utc>,
}

impl RoleAssignment {
    /// Creates a new assignment with an empty perimeter.
    pub fn new(principal: Principal, role: Uuid, folder: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            principal,
            role,
            folder,
            perimeter: HashSet::new(),
            is_recursive: false,
            builtin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Boundary constructor for callers holding raw optional references,
    /// e.g. a relational row with nullable user and group columns.
    ///
    /// # Errors
    ///
    /// [`IamError::InvalidAssignment`] when both or neither of `user`
    /// and `group` are set.
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use trellis_iam::RoleAssignment;
    ///
    /// let role = Uuid::now_v7();
    /// let folder = Uuid::now_v7();
    /// assert!(RoleAssignment::bind(None, None, role, folder).is_err());
    /// assert!(RoleAssignment::bind(Some(Uuid::now_v7()), None, role, folder).is_ok());
    /// ```
    pub fn bind(
        user: Option<Uuid>,
        group: Option<Uuid>,
        role: Uuid,
        folder: Uuid,
    ) -> IamResult<Self> {
        let principal = match (user, group) {
            (Some(user), None) => Principal::User(user),
            (None, Some(group)) => Principal::Group(group),
            _ => return Err(IamError::InvalidAssignment),
        };
        Ok(Self::new(principal, role, folder))
    }

    /// Add a folder to the perimeter.
    pub fn with_perimeter(mut self, folder: Uuid) -> Self {
        self.perimeter.insert(folder);
        self
    }

    /// Make the assignment recursive.
    pub fn recursive(mut self) -> Self {
        self.is_recursive = true;
        self
    }

    /// Mark the assignment as system-provisioned.
    pub fn as_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Check whether the assignment reaches a user, directly or through
    /// one of the user's groups.
    pub fn applies_to(&self, user: &User) -> bool {
        match self.principal {
            Principal::User(id) => id == user.id,
            Principal::Group(id) => user.in_group(id),
        }
    }
}

impl std::fmt::Display for RoleAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id={}, role={}, principal={:?}, folders={}",
            self.id,
            self.role,
            self.principal,
            self.perimeter.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_requires_exactly_one_principal() {
        let role = Uuid::now_v7();
        let folder = Uuid::now_v7();
        let user = Uuid::now_v7();
        let group = Uuid::now_v7();

        assert_eq!(
            RoleAssignment::bind(None, None, role, folder).unwrap_err(),
            IamError::InvalidAssignment
        );
        assert_eq!(
            RoleAssignment::bind(Some(user), Some(group), role, folder).unwrap_err(),
            IamError::InvalidAssignment
        );

        let ra = RoleAssignment::bind(Some(user), None, role, folder).unwrap();
        assert_eq!(ra.principal, Principal::User(user));

        let ra = RoleAssignment::bind(None, Some(group), role, folder).unwrap();
        assert_eq!(ra.principal, Principal::Group(group));
    }

    #[test]
    fn test_builders() {
        let role = Uuid::now_v7();
        let folder = Uuid::now_v7();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        let ra = RoleAssignment::new(Principal::User(Uuid::now_v7()), role, folder)
            .with_perimeter(a)
            .with_perimeter(b)
            .recursive()
            .as_builtin();

        assert_eq!(ra.perimeter.len(), 2);
        assert!(ra.is_recursive);
        assert!(ra.builtin);
    }

    #[test]
    fn test_applies_to() {
        let folder = Uuid::now_v7();
        let role = Uuid::now_v7();
        let group = Uuid::now_v7();
        let member = User::new("m@example.com", folder).with_group(group);
        let outsider = User::new("o@example.com", folder);

        let direct = RoleAssignment::new(Principal::User(member.id), role, folder);
        assert!(direct.applies_to(&member));
        assert!(!direct.applies_to(&outsider));

        let via_group = RoleAssignment::new(Principal::Group(group), role, folder);
        assert!(via_group.applies_to(&member));
        assert!(!via_group.applies_to(&outsider));
    }
}
