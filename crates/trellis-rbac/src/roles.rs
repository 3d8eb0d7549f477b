//! # Roles
//!
//! Roles are named, order-irrelevant sets of permission tokens. The
//! catalog validates every token against the resource-kind registry at
//! insertion, so an evaluator never sees a token for a kind nobody
//! defines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RbacError, RbacResult};
use crate::permissions::{PermissionSet, PermissionToken};
use crate::resources::{KindRegistry, ResourceKind};
use crate::verbs::Verb;

/// A role: a named set of permission tokens.
///
/// Builtin roles are system-provisioned and immutable by convention;
/// nothing in this crate mutates them after catalog construction.
///
/// # Examples
///
/// ```
/// use trellis_rbac::{PermissionToken, Role};
///
/// let role = Role::new("incident-handler")
///     .grant(PermissionToken::view_folder())
///     .grant(PermissionToken::tagging());
/// assert!(role.has(&PermissionToken::tagging()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier for the role
    pub id: Uuid,

    /// Role name, unique within a catalog
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// The permission tokens this role grants
    pub permissions: PermissionSet,

    /// Whether this role was provisioned by the system
    pub builtin: bool,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last updated
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new role with an empty permission set.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            permissions: PermissionSet::new(),
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

    /// Replace the permission set.
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Grant one token.
    pub fn grant(mut self, token: PermissionToken) -> Self {
        self.permissions.add(token);
        self
    }

    /// Mark the role as system-provisioned.
    pub fn as_builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Check if the role grants a token.
    pub fn has(&self, token: &PermissionToken) -> bool {
        self.permissions.contains(token)
    }
}

/// The builtin roles every domain is provisioned with.
///
/// Each domain gets one builtin user group per builtin role, bound by a
/// recursive role assignment over that domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinRole {
    /// Read-only access to domain content.
    Reader,

    /// Reader plus approval of pending changes.
    Approver,

    /// Creates and maintains domain content.
    Analyst,

    /// Full control within the domain, including folder management.
    DomainManager,
}

impl BuiltinRole {
    /// Get the codename of the role (also used to name the matching
    /// builtin user group).
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinRole::Reader => "reader",
            BuiltinRole::Approver => "approver",
            BuiltinRole::Analyst => "analyst",
            BuiltinRole::DomainManager => "domain_manager",
        }
    }

    /// Parse a codename.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reader" => Some(BuiltinRole::Reader),
            "approver" => Some(BuiltinRole::Approver),
            "analyst" => Some(BuiltinRole::Analyst),
            "domain_manager" | "domain-manager" => Some(BuiltinRole::DomainManager),
            _ => None,
        }
    }

    /// Get a human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BuiltinRole::Reader => "Reader",
            BuiltinRole::Approver => "Approver",
            BuiltinRole::Analyst => "Analyst",
            BuiltinRole::DomainManager => "Domain Manager",
        }
    }

    /// All builtin roles, in provisioning order.
    pub fn all() -> Vec<Self> {
        vec![
            BuiltinRole::Reader,
            BuiltinRole::Approver,
            BuiltinRole::Analyst,
            BuiltinRole::DomainManager,
        ]
    }

    /// The default permission set for this role over the registered kinds.
    ///
    /// - **Reader**: `view` on every kind
    /// - **Approver**: reader plus `approve` on every kind
    /// - **Analyst**: `view` everywhere, plus `add`/`change`/`delete` on
    ///   every kind except `folder`
    /// - **DomainManager**: every verb on every kind
    pub fn default_permissions(&self, kinds: &KindRegistry) -> PermissionSet {
        let folder = ResourceKind::folder();
        let mut set = PermissionSet::new();
        for (kind, _) in kinds.iter() {
            for verb in Verb::all() {
                let granted = match self {
                    BuiltinRole::Reader => verb == Verb::View,
                    BuiltinRole::Approver => matches!(verb, Verb::View | Verb::Approve),
                    BuiltinRole::Analyst => {
                        verb == Verb::View || (verb.is_write() && *kind != folder)
                    }
                    BuiltinRole::DomainManager => true,
                };
                if granted {
                    set.add(PermissionToken::new(verb, kind.clone()));
                }
            }
        }
        set
    }
}

/// Catalog of roles, indexed by id with unique names.
///
/// Token validation happens here: inserting a role whose permissions
/// reference an unregistered kind is rejected, keeping the catalog the
/// single place where token existence is checked.
///
/// # Examples
///
/// ```
/// use trellis_rbac::{BuiltinRole, KindRegistry, RoleCatalog};
///
/// let kinds = KindRegistry::builtin();
/// let catalog = RoleCatalog::with_builtins(&kinds).unwrap();
/// assert!(catalog.find_by_name(BuiltinRole::Reader.as_str()).is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCatalog {
    roles: HashMap<Uuid, Role>,
}

impl RoleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    /// Create a catalog holding the four builtin roles with their default
    /// permission sets over `kinds`.
    pub fn with_builtins(kinds: &KindRegistry) -> RbacResult<Self> {
        let mut catalog = Self::new();
        for builtin in BuiltinRole::all() {
            let role = Role::new(builtin.as_str())
                .with_description(builtin.display_name())
                .with_permissions(builtin.default_permissions(kinds))
                .as_builtin();
            catalog.insert(role, kinds)?;
        }
        Ok(catalog)
    }

    /// Insert a role after validating its tokens against the registry.
    ///
    /// Returns the role id.
    ///
    /// # Errors
    ///
    /// - [`RbacError::UnknownResourceKind`] if any token references an
    ///   unregistered kind
    /// - [`RbacError::DuplicateRole`] if a role with this name exists
    pub fn insert(&mut self, role: Role, kinds: &KindRegistry) -> RbacResult<Uuid> {
        for token in role.permissions.tokens() {
            if !kinds.defines(&token.kind) {
                return Err(RbacError::UnknownResourceKind(token.kind.to_string()));
            }
        }
        if self.find_by_name(&role.name).is_some() {
            return Err(RbacError::DuplicateRole(role.name));
        }
        let id = role.id;
        self.roles.insert(id, role);
        Ok(id)
    }

    /// Remove a role by id.
    pub fn remove(&mut self, id: Uuid) -> Option<Role> {
        self.roles.remove(&id)
    }

    /// Get a role by id.
    pub fn get(&self, id: Uuid) -> Option<&Role> {
        self.roles.get(&id)
    }

    /// Find a role by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    /// Iterate over all roles.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
