//! Scope discovery
//!
//! Folds the registered endpoint descriptors into a [`ScopeCatalogue`]:
//! app → resource → ordered scopes. Resource names come from
//! [`crate::scope::resolve_resource_name`], the same function the
//! authorizer uses, so the catalogue lists exactly the scopes that are
//! enforced.
//!
//! Per resource, scopes are ordered `read`, `write`, `delete` (those the
//! endpoint exposes) followed by custom actions in registration order.
//! Apps and resources are kept sorted so repeated runs produce identical
//! output.

pub mod render;

use scopegate_core::{EndpointDescriptor, Operation, Scope, SCOPE_SEPARATOR};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scope::resolve_resource_name;

/// A single endpoint's metadata could not be turned into scopes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("endpoint '{type_name}': resource name '{resource}' contains the scope separator")]
    InvalidResource { type_name: String, resource: String },

    #[error("endpoint '{type_name}': invalid custom action name '{action}'")]
    InvalidAction { type_name: String, action: String },

    #[error("endpoint '{type_name}': invalid required scope '{scope}'")]
    InvalidRequiredScope { type_name: String, scope: String },
}

/// Discovered scopes: app → resource → ordered scope strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScopeCatalogue {
    apps: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ScopeCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grouped view keyed by app
    pub fn apps(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.apps
    }

    /// Scopes for one resource within one app
    pub fn get(&self, app: &str, resource: &str) -> Option<&[String]> {
        self.apps
            .get(app)
            .and_then(|resources| resources.get(resource))
            .map(Vec::as_slice)
    }

    /// Flat resource → scopes view, merging resources shared across apps
    pub fn by_resource(&self) -> BTreeMap<String, Vec<String>> {
        let mut flat: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for resources in self.apps.values() {
            for (resource, scopes) in resources {
                let entry = flat.entry(resource.clone()).or_default();
                for scope in scopes {
                    if !entry.contains(scope) {
                        entry.push(scope.clone());
                    }
                }
            }
        }
        flat
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.iter().any(|s| s == scope)
    }

    /// Every scope, app by app and resource by resource
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.apps
            .values()
            .flat_map(|resources| resources.values())
            .flat_map(|scopes| scopes.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Number of distinct resource names
    pub fn resource_count(&self) -> usize {
        self.by_resource().len()
    }

    /// Number of distinct scopes
    pub fn scope_count(&self) -> usize {
        self.by_resource().values().map(Vec::len).sum()
    }

    fn push(&mut self, app: &str, resource: &str, scope: String) {
        let scopes = self
            .apps
            .entry(app.to_string())
            .or_default()
            .entry(resource.to_string())
            .or_default();

        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
}

/// Discovery over endpoint descriptors
pub struct ScopeDiscovery;

impl ScopeDiscovery {
    /// Build the catalogue for a set of endpoints
    ///
    /// Endpoints without a resource name are skipped. An endpoint whose
    /// metadata is invalid is logged and skipped; the rest still contribute.
    pub fn discover<'a, I>(endpoints: I) -> ScopeCatalogue
    where
        I: IntoIterator<Item = &'a EndpointDescriptor>,
    {
        let mut catalogue = ScopeCatalogue::new();

        for endpoint in endpoints {
            match Self::endpoint_scopes(endpoint) {
                Ok(Some((resource, scopes))) => {
                    for scope in scopes {
                        catalogue.push(&endpoint.app, &resource, scope.into_string());
                    }
                }
                Ok(None) => {
                    debug!(
                        type_name = %endpoint.type_name,
                        app = %endpoint.app,
                        "Endpoint has no resource name, skipping"
                    );
                }
                Err(e) => {
                    warn!(app = %endpoint.app, "Skipping endpoint during scope discovery: {}", e);
                }
            }
        }

        catalogue
    }

    /// Resource name and ordered scopes for one endpoint
    ///
    /// An explicit `required_scope` replaces the derived scopes: it is the
    /// only scope the endpoint ever checks, so it is the only one listed. An
    /// empty override checks nothing and lists nothing.
    pub fn endpoint_scopes(
        endpoint: &EndpointDescriptor,
    ) -> Result<Option<(String, Vec<Scope>)>, DiscoveryError> {
        if let Some(required) = &endpoint.required_scope {
            if required.is_empty() {
                return Ok(None);
            }
            let scope = Scope::parse(required).map_err(|_| DiscoveryError::InvalidRequiredScope {
                type_name: endpoint.type_name.clone(),
                scope: required.clone(),
            })?;
            return Ok(Some((scope.resource().to_string(), vec![scope])));
        }

        let Some(resource) = resolve_resource_name(endpoint) else {
            return Ok(None);
        };

        if resource.contains(SCOPE_SEPARATOR) {
            return Err(DiscoveryError::InvalidResource {
                type_name: endpoint.type_name.clone(),
                resource: resource.into_owned(),
            });
        }

        let actions = Self::ordered_actions(endpoint)?;
        let scopes = actions
            .iter()
            .map(|action| Scope::new(&resource, action))
            .collect();

        Ok(Some((resource.into_owned(), scopes)))
    }

    /// Standard buckets in canonical order, then custom actions as registered
    fn ordered_actions(endpoint: &EndpointDescriptor) -> Result<Vec<&str>, DiscoveryError> {
        let mut actions: Vec<&str> = [
            (Operation::Read, "read"),
            (Operation::Write, "write"),
            (Operation::Delete, "delete"),
        ]
        .iter()
        .filter(|(op, _)| endpoint.has_operation(op))
        .map(|(_, action)| *action)
        .collect();

        for custom in endpoint.custom_actions() {
            if !is_valid_action(custom) {
                return Err(DiscoveryError::InvalidAction {
                    type_name: endpoint.type_name.clone(),
                    action: custom.to_string(),
                });
            }
            if !actions.contains(&custom) {
                actions.push(custom);
            }
        }

        Ok(actions)
    }
}

fn is_valid_action(action: &str) -> bool {
    !action.is_empty()
        && !action.contains(SCOPE_SEPARATOR)
        && !action.chars().any(char::is_whitespace)
}

/// Endpoint descriptors registered at startup
///
/// Append-only while the application is being assembled; once serving, it
/// is only read, so discovery needs no locking.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<EndpointDescriptor>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor and get back the shared handle to enforce with
    pub fn register(&mut self, endpoint: EndpointDescriptor) -> Arc<EndpointDescriptor> {
        let endpoint = Arc::new(endpoint);
        self.endpoints.push(Arc::clone(&endpoint));
        endpoint
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter().map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn discover(&self) -> ScopeCatalogue {
        ScopeDiscovery::discover(self.iter())
    }
}

impl FromIterator<EndpointDescriptor> for EndpointRegistry {
    fn from_iter<I: IntoIterator<Item = EndpointDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for endpoint in iter {
            registry.register(endpoint);
        }
        registry
    }
}
