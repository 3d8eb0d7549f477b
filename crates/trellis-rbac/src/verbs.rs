//! # Verbs
//!
//! Defines the verbs that can appear in permission tokens. A token names
//! a verb applied to a resource kind, e.g. `view_folder` or
//! `change_risk_assessment`.

use serde::{Deserialize, Serialize};

/// Verbs that can be applied to resource kinds.
///
/// - **View**: read resource data
/// - **Add**: create new resource instances
/// - **Change**: modify existing resource data
/// - **Delete**: remove resource instances
/// - **Approve**: approve pending changes (reviews, acceptances)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// View/read a resource.
    View,

    /// Create a new resource.
    Add,

    /// Modify an existing resource.
    Change,

    /// Remove a resource.
    Delete,

    /// Approve a pending change.
    Approve,
}

impl Verb {
    /// Get the string representation of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::View => "view",
            Verb::Add => "add",
            Verb::Change => "change",
            Verb::Delete => "delete",
            Verb::Approve => "approve",
        }
    }

    /// Parse a verb from its string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_rbac::Verb;
    ///
    /// assert_eq!(Verb::parse("view"), Some(Verb::View));
    /// assert_eq!(Verb::parse("read"), Some(Verb::View)); // Alias
    /// assert_eq!(Verb::parse("update"), Some(Verb::Change)); // Alias
    /// assert_eq!(Verb::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "view" | "read" | "get" => Some(Verb::View),
            "add" | "create" | "new" => Some(Verb::Add),
            "change" | "update" | "edit" | "modify" => Some(Verb::Change),
            "delete" | "remove" | "destroy" => Some(Verb::Delete),
            "approve" | "accept" => Some(Verb::Approve),
            _ => None,
        }
    }

    /// Get all verbs.
    pub fn all() -> Vec<Self> {
        vec![
            Verb::View,
            Verb::Add,
            Verb::Change,
            Verb::Delete,
            Verb::Approve,
        ]
    }

    /// Check if this verb modifies data.
    ///
    /// A principal holding any write-verb token on any kind is considered
    /// an editor.
    pub fn is_write(&self) -> bool {
        matches!(self, Verb::Add | Verb::Change | Verb::Delete)
    }
}
