//! Principal domain models
//!
//! A principal is whoever a role can be assigned to: a user, or a user
//! group. Users belong to any number of groups and inherit every
//! assignment of each group; groups are themselves scoped to a folder.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user: a principal corresponding to a human.
///
/// Account lifecycle (passwords, login, mail) is owned by the identity
/// service; the engine only consumes the identity and group memberships.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_iam::User;
///
/// let root_id = Uuid::now_v7();
/// let group_id = Uuid::now_v7();
/// let user = User::new("ada@example.com", root_id).with_group(group_id);
/// assert!(user.in_group(group_id));
/// assert!(user.is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Email address, unique across the platform
    pub email: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Owning folder (users live at the root)
    pub folder: Uuid,

    /// The user groups this user belongs to. A user gets all
    /// assignments granted to each of their groups.
    #[serde(default)]
    pub groups: HashSet<Uuid>,

    /// Whether the user should be treated as active
    pub is_active: bool,

    /// Whether the user is an external third party
    pub is_third_party: bool,

    /// Free-form UI preferences
    #[serde(default)]
    pub preferences: HashMap<String, serde_json::Value>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user in the given folder.
    pub fn new(email: impl Into<String>, folder: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            first_name: None,
            last_name: None,
            folder,
            groups: HashSet::new(),
            is_active: true,
            is_third_party: false,
            preferences: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the first and last name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Add a group membership.
    pub fn with_group(mut self, group: Uuid) -> Self {
        self.groups.insert(group);
        self
    }

    /// Mark the user as an external third party.
    pub fn as_third_party(mut self) -> Self {
        self.is_third_party = true;
        self
    }

    /// Check membership in a group.
    pub fn in_group(&self, group: Uuid) -> bool {
        self.groups.contains(&group)
    }

    /// The user's full name, falling back to the email address.
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.email.clone(),
        }
    }
}

/// A user group: a principal containing users.
///
/// Groups are scoped to a folder. The four builtin groups of a domain
/// are created by the provisioner and carry the builtin flag.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use trellis_iam::UserGroup;
///
/// let domain_id = Uuid::now_v7();
/// let group = UserGroup::new("incident-response", domain_id);
/// assert_eq!(group.folder, domain_id);
/// assert!(!group.builtin);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroup {
    /// Unique identifier for the group
    pub id: Uuid,

    /// Group name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// The folder this group is scoped to
    pub folder: Uuid,

    /// Whether this group was provisioned by the system
    pub builtin: bool,

    /// When the group was created
    pub created_at: DateTime<Utc>,

    /// When the group was last updated
    pub updated_at: DateTime<Utc>,
}

impl UserGroup {
    /// Creates a new group scoped to a folder.
    pub fn new(name: impl Into<String>, folder: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            folder,
            builtin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the group as system-provisioned.
    pub fn as_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }
}

/// A principal: either a user or a user group.
///
/// The tagged variant makes "exactly one of user or group" structural;
/// see [`RoleAssignment::bind`](crate::RoleAssignment::bind) for the
/// boundary constructor accepting raw optional references.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// A user, by id.
    User(Uuid),
    /// A user group, by id.
    Group(Uuid),
}

impl Principal {
    /// The underlying id.
    pub fn id(&self) -> Uuid {
        match self {
            Principal::User(id) | Principal::Group(id) => *id,
        }
    }

    /// Check if this principal is a user.
    pub fn is_user(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    /// Check if this principal is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Principal::Group(_))
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal::User(user.id)
    }
}

impl From<&UserGroup> for Principal {
    fn from(group: &UserGroup) -> Self {
        Principal::Group(group.id)
    }
}
