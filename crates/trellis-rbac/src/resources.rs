//! # Resource Kinds
//!
//! Defines resource kinds and the registry describing how each kind is
//! located in the folder hierarchy. The registry is owned by the service
//! layer that defines the domain objects; the authorization engine only
//! consults it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, RbacResult};

/// A resource kind, the `<kind>` half of a permission token.
///
/// Kinds are lowercase identifiers (`[a-z][a-z0-9_]*`) naming a category
/// of domain objects: `folder`, `risk_assessment`, `tag`, …
///
/// # Examples
///
/// ```
/// use trellis_rbac::ResourceKind;
///
/// let kind = ResourceKind::new("risk_assessment").unwrap();
/// assert_eq!(kind.as_str(), "risk_assessment");
/// assert!(ResourceKind::new("Not An Ident").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ResourceKind(String);

impl ResourceKind {
    /// Create a kind, validating the identifier.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidResourceKind`] if the name is empty, does not
    /// start with a lowercase letter, or contains anything other than
    /// lowercase letters, digits and underscores.
    pub fn new(name: impl Into<String>) -> RbacResult<Self> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = matches!(chars.next(), Some('a'..='z'))
            && chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'));
        if !valid {
            return Err(RbacError::InvalidResourceKind(name));
        }
        Ok(Self(name))
    }

    /// The `folder` kind, always present.
    pub fn folder() -> Self {
        Self("folder".to_string())
    }

    /// The `tag` kind, target of the global tagging escape hatch.
    pub fn tag() -> Self {
        Self("tag".to_string())
    }

    /// Get the string representation of the kind.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ResourceKind {
    type Error = RbacError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How objects of a kind are located in the folder hierarchy.
///
/// Drives the inverse resolution protocol: "which objects of this kind
/// live in folder F".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationRule {
    /// The kind IS the folder; the object located in F is F itself.
    SelfFolder,

    /// Objects carry a direct `folder` reference.
    Direct,

    /// Objects reach their folder through one intermediate link; the
    /// linked object carries the direct `folder` reference.
    Via(String),
}

/// Registry entry describing a resource kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindSpec {
    /// How objects of the kind are located in a folder.
    pub location: LocationRule,

    /// Whether objects of the kind carry a publication flag.
    ///
    /// Only meaningful together with [`LocationRule::Direct`]; published
    /// objects become visible to viewers of descendant domains.
    pub publishable: bool,
}

impl KindSpec {
    /// A kind whose objects carry a direct folder reference.
    pub fn direct() -> Self {
        Self {
            location: LocationRule::Direct,
            publishable: false,
        }
    }

    /// A kind located through one intermediate link.
    pub fn via(link: impl Into<String>) -> Self {
        Self {
            location: LocationRule::Via(link.into()),
            publishable: false,
        }
    }

    /// The folder kind itself.
    pub fn self_folder() -> Self {
        Self {
            location: LocationRule::SelfFolder,
            publishable: false,
        }
    }

    /// Mark the kind as publishable.
    pub fn publishable(mut self) -> Self {
        self.publishable = true;
        self
    }
}

/// Registry of resource kinds and their location rules.
///
/// Owned by the collaborator defining the domain objects. Permission
/// tokens are validated against it at the role-catalog boundary, and the
/// accessible-object queries consult it for the inverse protocol.
///
/// # Examples
///
/// ```
/// use trellis_rbac::{KindRegistry, KindSpec, ResourceKind};
///
/// let mut kinds = KindRegistry::builtin();
/// assert!(kinds.defines(&ResourceKind::folder()));
///
/// // a new kind registers a rule without touching evaluator logic
/// let audit = ResourceKind::new("audit_campaign").unwrap();
/// kinds.register(audit.clone(), KindSpec::direct());
/// assert!(kinds.defines(&audit));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindRegistry {
    kinds: HashMap<ResourceKind, KindSpec>,
}

impl KindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Create a registry preloaded with the builtin platform kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let entries: [(&str, KindSpec); 12] = [
            ("folder", KindSpec::self_folder()),
            ("perimeter", KindSpec::direct()),
            ("entity", KindSpec::direct()),
            ("provider_entity", KindSpec::direct()),
            ("solution", KindSpec::via("provider_entity")),
            ("risk_assessment", KindSpec::direct()),
            ("risk_scenario", KindSpec::via("risk_assessment")),
            ("compliance_assessment", KindSpec::direct()),
            ("threat", KindSpec::direct().publishable()),
            ("reference_control", KindSpec::direct().publishable()),
            ("evidence", KindSpec::direct()),
            ("tag", KindSpec::direct()),
        ];
        for (name, spec) in entries {
            registry.register(ResourceKind::new(name).expect("builtin kind"), spec);
        }
        registry
    }

    /// Register a kind, replacing any previous entry.
    pub fn register(&mut self, kind: ResourceKind, spec: KindSpec) {
        self.kinds.insert(kind, spec);
    }

    /// Get the spec for a kind.
    pub fn spec(&self, kind: &ResourceKind) -> Option<&KindSpec> {
        self.kinds.get(kind)
    }

    /// Check if a kind is registered.
    pub fn defines(&self, kind: &ResourceKind) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Iterate over all registered kinds.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &KindSpec)> {
        self.kinds.iter()
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_validation() {
        assert!(ResourceKind::new("folder").is_ok());
        assert!(ResourceKind::new("risk_assessment").is_ok());
        assert!(ResourceKind::new("v2_entity").is_ok());

        assert_eq!(
            ResourceKind::new(""),
            Err(RbacError::InvalidResourceKind(String::new()))
        );
        assert!(ResourceKind::new("Folder").is_err());
        assert!(ResourceKind::new("_tag").is_err());
        assert!(ResourceKind::new("2fa").is_err());
        assert!(ResourceKind::new("with space").is_err());
    }

    #[test]
    fn test_builtin_registry() {
        let kinds = KindRegistry::builtin();
        assert!(kinds.defines(&ResourceKind::folder()));
        assert!(kinds.defines(&ResourceKind::tag()));

        let folder_spec = kinds.spec(&ResourceKind::folder()).unwrap();
        assert_eq!(folder_spec.location, LocationRule::SelfFolder);

        let scenario = ResourceKind::new("risk_scenario").unwrap();
        assert_eq!(
            kinds.spec(&scenario).unwrap().location,
            LocationRule::Via("risk_assessment".to_string())
        );

        let threat = ResourceKind::new("threat").unwrap();
        assert!(kinds.spec(&threat).unwrap().publishable);
    }

    #[test]
    fn test_register_new_kind() {
        let mut kinds = KindRegistry::new();
        assert!(kinds.is_empty());

        let kind = ResourceKind::new("incident").unwrap();
        kinds.register(kind.clone(), KindSpec::direct().publishable());
        assert_eq!(kinds.len(), 1);
        assert!(kinds.spec(&kind).unwrap().publishable);
    }
}
