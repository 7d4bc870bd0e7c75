//! Endpoint descriptors and operation kinds
//!
//! An [`EndpointDescriptor`] is the static metadata the routing layer hands
//! over for each registered endpoint. Descriptors are built once at startup
//! and never mutated while serving.

use serde::{Deserialize, Serialize};

/// Kind of operation an endpoint exposes or a request invokes
///
/// Standard handlers collapse into three canonical buckets; every other
/// named operation is carried through as [`Operation::Custom`]. Build
/// operations with [`Operation::from_handler`] or [`Operation::custom`] so a
/// `Custom` never holds a handler alias; the serialized form is the action
/// name and maps back through the same table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    /// Safe and listing operations (`list`, `retrieve`)
    Read,
    /// Create and update operations (`create`, `update`, `partial_update`)
    Write,
    /// Destructive operations (`destroy`)
    Delete,
    /// Explicitly registered operation, named after itself
    Custom(String),
}

impl Operation {
    /// Map a handler name to its operation kind
    ///
    /// The canonical action names are accepted as aliases of their bucket.
    pub fn from_handler(name: &str) -> Self {
        match name {
            "list" | "retrieve" | "read" => Operation::Read,
            "create" | "update" | "partial_update" | "write" => Operation::Write,
            "destroy" | "delete" => Operation::Delete,
            other => Operation::Custom(other.to_string()),
        }
    }

    /// Map an HTTP method to its operation kind
    ///
    /// Unknown methods fall back to [`Operation::Read`].
    pub fn from_http_method(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "POST" | "PUT" | "PATCH" => Operation::Write,
            "DELETE" => Operation::Delete,
            _ => Operation::Read,
        }
    }

    /// Named operation; standard handler names land in their bucket
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        match Operation::from_handler(&name) {
            Operation::Custom(_) => Operation::Custom(name),
            standard => standard,
        }
    }

    /// Action half of the scope this operation requires
    pub fn action(&self) -> &str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::Custom(name) => name,
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, Operation::Custom(_))
    }
}

impl From<String> for Operation {
    fn from(name: String) -> Self {
        Operation::from_handler(&name)
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.action().to_string()
    }
}

/// Static metadata for one registered endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Owning module ("app") the endpoint is grouped under
    pub app: String,

    /// Implementation identifier (e.g. `PostViewSet` or a full type path)
    pub type_name: String,

    /// Explicit resource name; wins over the derived name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Explicit required scope; bypasses resource/action derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scope: Option<String>,

    /// Operations in registration order
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl EndpointDescriptor {
    pub fn new(app: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            type_name: type_name.into(),
            resource: None,
            required_scope: None,
            operations: Vec::new(),
        }
    }

    /// Descriptor whose implementation identifier is the Rust type name of `T`
    pub fn for_type<T: ?Sized>(app: impl Into<String>) -> Self {
        Self::new(app, std::any::type_name::<T>())
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_required_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = Some(scope.into());
        self
    }

    /// Register a handler by name (`list`, `create`, `destroy`, ...)
    pub fn with_handler(mut self, name: &str) -> Self {
        self.operations.push(Operation::from_handler(name));
        self
    }

    pub fn with_handlers<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.operations
            .extend(names.into_iter().map(Operation::from_handler));
        self
    }

    /// Register a named action (`publish`, `archive`, ...)
    ///
    /// A standard handler name (`create`, `destroy`, ...) registers its
    /// bucket, matching what a route invoking that handler enforces.
    pub fn with_custom_action(mut self, name: impl Into<String>) -> Self {
        self.operations.push(Operation::custom(name));
        self
    }

    pub fn has_operation(&self, op: &Operation) -> bool {
        self.operations.contains(op)
    }

    /// Custom operation names in registration order
    pub fn custom_actions(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Custom(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_mapping() {
        assert_eq!(Operation::from_handler("list"), Operation::Read);
        assert_eq!(Operation::from_handler("retrieve"), Operation::Read);
        assert_eq!(Operation::from_handler("create"), Operation::Write);
        assert_eq!(Operation::from_handler("update"), Operation::Write);
        assert_eq!(Operation::from_handler("partial_update"), Operation::Write);
        assert_eq!(Operation::from_handler("destroy"), Operation::Delete);
        assert_eq!(
            Operation::from_handler("publish"),
            Operation::Custom("publish".to_string())
        );
    }

    #[test]
    fn test_http_method_mapping() {
        for method in ["GET", "HEAD", "OPTIONS", "get"] {
            assert_eq!(Operation::from_http_method(method), Operation::Read);
        }
        for method in ["POST", "PUT", "PATCH"] {
            assert_eq!(Operation::from_http_method(method), Operation::Write);
        }
        assert_eq!(Operation::from_http_method("DELETE"), Operation::Delete);
        assert_eq!(Operation::from_http_method("TRACE"), Operation::Read);
    }

    #[test]
    fn test_operation_actions() {
        assert_eq!(Operation::Read.action(), "read");
        assert_eq!(Operation::Write.action(), "write");
        assert_eq!(Operation::Delete.action(), "delete");
        assert_eq!(Operation::custom("publish").action(), "publish");
        assert!(!Operation::custom("publish").is_standard());
    }

    #[test]
    fn test_descriptor_builder() {
        let endpoint = EndpointDescriptor::new("blog", "PostViewSet")
            .with_resource("posts")
            .with_handlers(["list", "create"])
            .with_custom_action("publish");

        assert_eq!(endpoint.resource.as_deref(), Some("posts"));
        assert!(endpoint.has_operation(&Operation::Read));
        assert!(endpoint.has_operation(&Operation::Write));
        assert!(!endpoint.has_operation(&Operation::Delete));
        assert_eq!(endpoint.custom_actions().collect::<Vec<_>>(), vec!["publish"]);
    }

    #[test]
    fn test_descriptor_manifest_format() {
        let json = r#"{
            "app": "blog",
            "type_name": "PostViewSet",
            "resource": "posts",
            "operations": ["list", "destroy", "publish"]
        }"#;

        let endpoint: EndpointDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(
            endpoint.operations,
            vec![Operation::Read, Operation::Delete, Operation::custom("publish")]
        );
        assert!(endpoint.required_scope.is_none());
    }

    #[test]
    fn test_custom_action_with_handler_name_joins_bucket() {
        assert_eq!(Operation::custom("create"), Operation::Write);
        assert_eq!(Operation::custom("list"), Operation::Read);
        assert_eq!(Operation::custom("destroy"), Operation::Delete);

        let endpoint = EndpointDescriptor::new("blog", "PostViewSet").with_custom_action("create");
        assert!(endpoint.has_operation(&Operation::from_handler("create")));
        assert_eq!(endpoint.custom_actions().count(), 0);
    }

    #[test]
    fn test_operations_survive_serde() {
        let endpoint = EndpointDescriptor::new("blog", "PostViewSet")
            .with_handlers(["list", "partial_update"])
            .with_custom_action("list")
            .with_custom_action("destroy")
            .with_custom_action("publish");

        let json = serde_json::to_string(&endpoint).unwrap();
        let back: EndpointDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
        assert_eq!(
            back.operations,
            vec![
                Operation::Read,
                Operation::Write,
                Operation::Read,
                Operation::Delete,
                Operation::custom("publish"),
            ]
        );
    }
}
