//! Scope and grant set types
//!
//! A scope is an atomic `resource.action` string. Scopes carry no wildcard
//! or hierarchy semantics: two scopes match only when their strings are
//! equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Separator between the resource and action halves of a scope
pub const SCOPE_SEPARATOR: char = '.';

/// Errors that can occur while parsing a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Empty scope string provided
    EmptyScope,
    /// No separator between resource and action
    MissingSeparator(String),
    /// Resource half is empty
    EmptyResource(String),
    /// Action half is empty
    EmptyAction(String),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScope => write!(f, "Scope cannot be empty"),
            Self::MissingSeparator(s) => {
                write!(f, "Scope '{}' has no '{}' separator", s, SCOPE_SEPARATOR)
            }
            Self::EmptyResource(s) => write!(f, "Scope '{}' has an empty resource", s),
            Self::EmptyAction(s) => write!(f, "Scope '{}' has an empty action", s),
        }
    }
}

impl std::error::Error for ScopeError {}

/// A `resource.action` scope
///
/// The resource is everything before the first separator; the action is the
/// remainder. Both halves are case-sensitive.
///
/// # Examples
///
/// ```
/// use scopegate_core::Scope;
///
/// let scope = Scope::new("posts", "read");
/// assert_eq!(scope.as_str(), "posts.read");
/// assert_eq!(scope.resource(), "posts");
/// assert_eq!(scope.action(), "read");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope {
    raw: String,
    split: usize,
}

impl Scope {
    /// Build a scope from its two halves
    pub fn new(resource: &str, action: &str) -> Self {
        Self {
            raw: format!("{}{}{}", resource, SCOPE_SEPARATOR, action),
            split: resource.len(),
        }
    }

    /// Parse a scope string, rejecting strings without both halves
    pub fn parse(s: &str) -> Result<Self, ScopeError> {
        if s.is_empty() {
            return Err(ScopeError::EmptyScope);
        }

        let split = s
            .find(SCOPE_SEPARATOR)
            .ok_or_else(|| ScopeError::MissingSeparator(s.to_string()))?;

        if split == 0 {
            return Err(ScopeError::EmptyResource(s.to_string()));
        }
        if split + SCOPE_SEPARATOR.len_utf8() == s.len() {
            return Err(ScopeError::EmptyAction(s.to_string()));
        }

        Ok(Self {
            raw: s.to_string(),
            split,
        })
    }

    /// Returns the raw scope string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the resource half
    pub fn resource(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Returns the action half
    pub fn action(&self) -> &str {
        &self.raw[self.split + SCOPE_SEPARATOR.len_utf8()..]
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Scope {
    type Error = ScopeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.raw
    }
}

impl AsRef<str> for Scope {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Set of scopes granted to a credential or a group
///
/// Stored grants are kept as plain strings so that a malformed grant stays
/// inert (it can never equal a well-formed required scope) instead of
/// failing the whole record. Iteration order is sorted, which keeps
/// serialized records and rendered summaries stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantSet(BTreeSet<String>);

impl GrantSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Exact-string membership test
    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn insert(&mut self, scope: impl Into<String>) -> bool {
        self.0.insert(scope.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Merge another grant set into this one
    pub fn union_with(&mut self, other: &GrantSet) {
        self.0.extend(other.0.iter().cloned());
    }
}

impl<S: Into<String>> FromIterator<S> for GrantSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for GrantSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a GrantSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
