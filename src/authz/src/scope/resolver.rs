//! Resource name resolution
//!
//! Both discovery and the authorizer derive scopes through [`scope_for`], so
//! the catalogue an operator assigns from is exactly what gets enforced.

use scopegate_core::{EndpointDescriptor, Operation, Scope};
use std::borrow::Cow;

/// Suffixes stripped from an implementation identifier, checked in order
pub const STRIPPED_SUFFIXES: &[&str] = &["ViewSet", "View", "Handler"];

/// Canonical resource name for an endpoint
///
/// An explicit, non-empty `resource` wins unconditionally. Otherwise the name
/// is derived from `type_name`. `None` means the endpoint has no resource:
/// no scope is required for it and it is left out of the catalogue.
///
/// # Examples
///
/// ```
/// use scopegate_authz::scope::resolve_resource_name;
/// use scopegate_core::EndpointDescriptor;
///
/// let endpoint = EndpointDescriptor::new("shop", "OrderItemViewSet");
/// assert_eq!(resolve_resource_name(&endpoint).as_deref(), Some("orderitem"));
///
/// let endpoint = endpoint.with_resource("order-items");
/// assert_eq!(resolve_resource_name(&endpoint).as_deref(), Some("order-items"));
/// ```
pub fn resolve_resource_name(endpoint: &EndpointDescriptor) -> Option<Cow<'_, str>> {
    match endpoint.resource.as_deref() {
        Some(explicit) if !explicit.is_empty() => Some(Cow::Borrowed(explicit)),
        _ => derive_resource_name(&endpoint.type_name).map(Cow::Owned),
    }
}

/// Derive a resource name from an implementation identifier
///
/// Module path and generic arguments are dropped, then the first matching
/// suffix from [`STRIPPED_SUFFIXES`], then the rest is lower-cased:
/// `blog::api::PostViewSet<Db>` becomes `post`.
pub fn derive_resource_name(type_name: &str) -> Option<String> {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let base = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim();

    let stem = STRIPPED_SUFFIXES
        .iter()
        .find_map(|suffix| base.strip_suffix(suffix))
        .unwrap_or(base);

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_lowercase())
    }
}

/// Scope derived from the endpoint's resource name and the operation
///
/// Ignores `required_scope`; callers that enforce decide precedence.
pub fn scope_for(endpoint: &EndpointDescriptor, operation: &Operation) -> Option<Scope> {
    resolve_resource_name(endpoint).map(|resource| Scope::new(&resource, operation.action()))
}
