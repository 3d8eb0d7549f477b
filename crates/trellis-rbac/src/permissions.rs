//! # Permissions
//!
//! Permission tokens and sets. A token combines a verb with a resource
//! kind under the `<verb>_<kind>` naming convention; a role is a named
//! set of tokens.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RbacError, RbacResult};
use crate::resources::ResourceKind;
use crate::verbs::Verb;

/// A permission token: a verb applied to a resource kind.
///
/// Tokens render as `<verb>_<kind>`, e.g. `view_folder` or
/// `change_risk_assessment`. They are opaque to the evaluator apart from
/// the single tagging escape hatch ([`PermissionToken::tagging`]).
///
/// # Examples
///
/// ```
/// use trellis_rbac::{PermissionToken, ResourceKind, Verb};
///
/// let kind = ResourceKind::new("risk_assessment").unwrap();
/// let token = PermissionToken::new(Verb::View, kind.clone());
/// assert_eq!(token.to_string(), "view_risk_assessment");
///
/// let parsed = PermissionToken::parse("view_risk_assessment").unwrap();
/// assert_eq!(parsed, token);
/// assert_eq!(parsed.kind, kind);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "String", try_from = "String")]
pub struct PermissionToken {
    /// The verb half of the token.
    pub verb: Verb,
    /// The resource kind half of the token.
    pub kind: ResourceKind,
}

impl PermissionToken {
    /// Create a token from a verb and kind.
    pub fn new(verb: Verb, kind: ResourceKind) -> Self {
        Self { verb, kind }
    }

    /// `view_<kind>`
    pub fn view(kind: ResourceKind) -> Self {
        Self::new(Verb::View, kind)
    }

    /// `add_<kind>`
    pub fn add(kind: ResourceKind) -> Self {
        Self::new(Verb::Add, kind)
    }

    /// `change_<kind>`
    pub fn change(kind: ResourceKind) -> Self {
        Self::new(Verb::Change, kind)
    }

    /// `delete_<kind>`
    pub fn delete(kind: ResourceKind) -> Self {
        Self::new(Verb::Delete, kind)
    }

    /// `view_folder`, the reference token gating every bulk enumeration.
    pub fn view_folder() -> Self {
        Self::view(ResourceKind::folder())
    }

    /// `add_tag`, the global tagging token.
    ///
    /// A principal holding it in any assignment may tag objects anywhere,
    /// regardless of folder.
    pub fn tagging() -> Self {
        Self::add(ResourceKind::tag())
    }

    /// Parse a token from `<verb>_<kind>` form.
    ///
    /// The verb never contains an underscore, so the split happens at the
    /// first one; the kind may contain more (`view_risk_assessment`).
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidToken`] if the string has no underscore or an
    /// unknown verb; [`RbacError::InvalidResourceKind`] if the kind half
    /// is not a valid identifier.
    pub fn parse(s: &str) -> RbacResult<Self> {
        let (verb, kind) = s
            .split_once('_')
            .ok_or_else(|| RbacError::InvalidToken(s.to_string()))?;
        let verb = Verb::parse(verb).ok_or_else(|| RbacError::InvalidToken(s.to_string()))?;
        Ok(Self::new(verb, ResourceKind::new(kind)?))
    }
}

impl std::fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.verb.as_str(), self.kind.as_str())
    }
}

impl From<PermissionToken> for String {
    fn from(token: PermissionToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for PermissionToken {
    type Error = RbacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// A set of permission tokens, as held by a role.
///
/// A plain set: no wildcard or implication semantics, repeated adds are
/// idempotent. Tokens are stored in string form for cheap comparison and
/// serialization.
///
/// # Examples
///
/// ```
/// use trellis_rbac::{PermissionSet, PermissionToken, ResourceKind};
///
/// let kind = ResourceKind::new("evidence").unwrap();
/// let mut set = PermissionSet::new();
/// set.add(PermissionToken::view(kind.clone()));
/// set.add(PermissionToken::view(kind.clone()));
///
/// assert_eq!(set.len(), 1);
/// assert!(set.contains(&PermissionToken::view(kind.clone())));
/// assert!(!set.contains(&PermissionToken::delete(kind)));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionSet {
    /// The tokens in this set, in `<verb>_<kind>` form.
    permissions: HashSet<String>,
}

impl PermissionSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }

    /// Add a token to the set.
    pub fn add(&mut self, token: PermissionToken) {
        self.permissions.insert(token.to_string());
    }

    /// Add every token from an iterator.
    pub fn add_all<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = PermissionToken>,
    {
        for token in tokens {
            self.add(token);
        }
    }

    /// Remove a token from the set.
    ///
    /// Returns `true` if the token was present.
    pub fn remove(&mut self, token: &PermissionToken) -> bool {
        self.permissions.remove(&token.to_string())
    }

    /// Check if the set contains a token. Exact match only.
    pub fn contains(&self, token: &PermissionToken) -> bool {
        self.permissions.contains(&token.to_string())
    }

    /// Get all tokens in the set.
    pub fn tokens(&self) -> Vec<PermissionToken> {
        self.permissions
            .iter()
            .filter_map(|s| PermissionToken::parse(s).ok())
            .collect()
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        for token in &other.permissions {
            self.permissions.insert(token.clone());
        }
    }

    /// Create a set from token strings, skipping invalid entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_rbac::PermissionSet;
    ///
    /// let set = PermissionSet::from_strs(&["view_folder", "not a token"]);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn from_strs(tokens: &[&str]) -> Self {
        let mut set = Self::new();
        for token in tokens {
            if let Ok(parsed) = PermissionToken::parse(token) {
                set.add(parsed);
            }
        }
        set
    }

    /// Get the count of tokens.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<PermissionToken> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionToken>>(iter: T) -> Self {
        let mut set = PermissionSet::new();
        for token in iter {
            set.add(token);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> ResourceKind {
        ResourceKind::new(name).unwrap()
    }

    #[test]
    fn test_token_display() {
        let token = PermissionToken::view(kind("folder"));
        assert_eq!(token.to_string(), "view_folder");

        let token = PermissionToken::change(kind("risk_assessment"));
        assert_eq!(token.to_string(), "change_risk_assessment");
    }

    #[test]
    fn test_token_parse_splits_at_first_underscore() {
        let token = PermissionToken::parse("view_provider_entity").unwrap();
        assert_eq!(token.verb, Verb::View);
        assert_eq!(token.kind, kind("provider_entity"));
    }

    #[test]
    fn test_token_parse_errors() {
        assert_eq!(
            PermissionToken::parse("folder"),
            Err(RbacError::InvalidToken("folder".to_string()))
        );
        assert_eq!(
            PermissionToken::parse("frobnicate_folder"),
            Err(RbacError::InvalidToken("frobnicate_folder".to_string()))
        );
        assert!(matches!(
            PermissionToken::parse("view_"),
            Err(RbacError::InvalidResourceKind(_))
        ));
    }

    #[test]
    fn test_tagging_token() {
        assert_eq!(PermissionToken::tagging().to_string(), "add_tag");
        assert_eq!(PermissionToken::view_folder().to_string(), "view_folder");
    }

    #[test]
    fn test_set_idempotent_add() {
        let mut set = PermissionSet::new();
        set.add(PermissionToken::view(kind("evidence")));
        set.add(PermissionToken::view(kind("evidence")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_exact_match_only() {
        let mut set = PermissionSet::new();
        set.add(PermissionToken::change(kind("evidence")));

        // no implication: change does not grant view
        assert!(!set.contains(&PermissionToken::view(kind("evidence"))));
        assert!(set.contains(&PermissionToken::change(kind("evidence"))));
    }

    #[test]
    fn test_set_merge() {
        let mut a = PermissionSet::from_strs(&["view_folder"]);
        let b = PermissionSet::from_strs(&["view_folder", "add_tag"]);
        a.merge(&b);
        assert_eq!(a.len(), 2);
        assert!(a.contains(&PermissionToken::tagging()));
    }

    #[test]
    fn test_set_remove() {
        let mut set = PermissionSet::from_strs(&["view_folder"]);
        assert!(set.remove(&PermissionToken::view_folder()));
        assert!(!set.remove(&PermissionToken::view_folder()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_round_trip_tokens() {
        let set = PermissionSet::from_strs(&["view_folder", "delete_evidence"]);
        let mut tokens: Vec<String> = set.tokens().iter().map(|t| t.to_string()).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["delete_evidence", "view_folder"]);
    }
}
