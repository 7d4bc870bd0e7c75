//! Resource name resolution and scope derivation
//!
//! This module is the single source of truth for turning endpoint metadata
//! into `resource.action` scopes.
//!
//! # Examples
//!
//! ```
//! use scopegate_authz::scope::scope_for;
//! use scopegate_core::{EndpointDescriptor, Operation};
//!
//! let posts = EndpointDescriptor::new("blog", "PostViewSet").with_resource("posts");
//! assert_eq!(scope_for(&posts, &Operation::Read).unwrap().as_str(), "posts.read");
//! ```

mod resolver;


pub use resolver::{derive_resource_name, resolve_resource_name, scope_for, STRIPPED_SUFFIXES};
pub use scopegate_core::types::{Scope, ScopeError};
