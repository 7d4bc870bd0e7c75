//! Human-facing views of the scope catalogue
//!
//! Everything here is a pure function of a [`ScopeCatalogue`] (and, for the
//! checkbox model, a grant set). Nothing here affects enforcement.

use scopegate_core::{GrantSet, SCOPE_SEPARATOR};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::ScopeCatalogue;

/// Label used for a credential with no grants
pub const UNRESTRICTED_LABEL: &str = "Unrestricted (legacy)";

/// A scope paired with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeChoice {
    pub scope: String,
    pub label: String,
}

/// A selectable scope in an assignment form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeOption {
    pub scope: String,
    pub label: String,
    pub checked: bool,
}

/// Title-case a resource or action name, treating `_` as a word break
///
/// ```
/// use scopegate_authz::discovery::render::humanize;
///
/// assert_eq!(humanize("bulk_export"), "Bulk Export");
/// assert_eq!(humanize("order-items"), "Order-Items");
/// ```
pub fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

fn split_scope(scope: &str) -> (&str, &str) {
    scope.split_once(SCOPE_SEPARATOR).unwrap_or((scope, ""))
}

/// Every scope with a `Resource - Action` label, sorted by resource
pub fn choices(catalogue: &ScopeCatalogue) -> Vec<ScopeChoice> {
    catalogue
        .by_resource()
        .into_values()
        .flatten()
        .map(|scope| {
            let (resource, action) = split_scope(&scope);
            let label = format!("{} - {}", humanize(resource), humanize(action));
            ScopeChoice { scope, label }
        })
        .collect()
}

fn action_choices(scopes: &[String]) -> Vec<ScopeChoice> {
    scopes
        .iter()
        .map(|scope| ScopeChoice {
            scope: scope.clone(),
            label: humanize(split_scope(scope).1),
        })
        .collect()
}

/// Resource display name → scopes labelled by action
pub fn group_by_resource(catalogue: &ScopeCatalogue) -> BTreeMap<String, Vec<ScopeChoice>> {
    catalogue
        .by_resource()
        .into_iter()
        .map(|(resource, scopes)| (humanize(&resource), action_choices(&scopes)))
        .collect()
}

/// App → resource display name → scopes labelled by action
pub fn group_by_app(
    catalogue: &ScopeCatalogue,
) -> BTreeMap<String, BTreeMap<String, Vec<ScopeChoice>>> {
    catalogue
        .apps()
        .iter()
        .map(|(app, resources)| {
            let grouped = resources
                .iter()
                .map(|(resource, scopes)| (humanize(resource), action_choices(scopes)))
                .collect();
            (app.clone(), grouped)
        })
        .collect()
}

/// Assignment options with the scopes already in `granted` checked
///
/// Grants that are no longer in the catalogue are not offered.
pub fn checkbox_options(catalogue: &ScopeCatalogue, granted: &GrantSet) -> Vec<ScopeOption> {
    choices(catalogue)
        .into_iter()
        .map(|choice| ScopeOption {
            checked: granted.contains(&choice.scope),
            scope: choice.scope,
            label: choice.label,
        })
        .collect()
}

/// Compact one-line summary of a grant set
///
/// `posts(read, write) | comments(read)`, resources in first-seen order of
/// the sorted grants. Entries without a separator are left out.
pub fn summarize_grants(grants: &GrantSet) -> String {
    if grants.is_empty() {
        return UNRESTRICTED_LABEL.to_string();
    }

    let mut by_resource: Vec<(&str, Vec<&str>)> = Vec::new();
    for scope in grants.iter() {
        let Some((resource, action)) = scope.split_once(SCOPE_SEPARATOR) else {
            continue;
        };
        match by_resource.iter_mut().find(|(r, _)| *r == resource) {
            Some((_, actions)) => actions.push(action),
            None => by_resource.push((resource, vec![action])),
        }
    }

    by_resource
        .iter()
        .map(|(resource, actions)| format!("{}({})", resource, actions.join(", ")))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Plain-text listing for terminals
pub fn format_listing(catalogue: &ScopeCatalogue) -> String {
    if catalogue.is_empty() {
        return "No scopes found. Make sure your endpoints are registered.\n".to_string();
    }

    let flat = catalogue.by_resource();
    let mut out = String::from("Available API Scopes:\n\n");
    let mut total = 0;

    for (resource, scopes) in &flat {
        let _ = writeln!(out, "{}:", resource);
        for scope in scopes {
            let _ = writeln!(out, "  - {}", scope);
            total += 1;
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Total: {} resources, {} scopes", flat.len(), total);
    out
}
