//! A queryable tree of context elements.
//!
//! Statistics live somewhere: a cache, one of its tiers, a thread pool. Each such place is described by a
//! [`ContextElement`] (a type [`Identifier`] plus a set of named attributes) and placed as a [`TreeNode`] in the tree
//! owned by a [`ContextRegistry`]. Consumers then locate what they care about by running a [`Query`] over the tree,
//! typically built with [`QueryBuilder`] from the traversals and [matchers] in this crate:
//!
//! ```
//! use std::sync::Arc;
//!
//! use vitals_context::{
//!     matchers::{attributes, context, has_attribute},
//!     ContextRegistry, Identifier, LazyContextElement, QueryBuilder,
//! };
//!
//! struct Cache;
//!
//! let registry = ContextRegistry::new();
//! let cache = LazyContextElement::new(Identifier::of::<Cache>()).with_value("name", "users".to_string());
//! registry.register(registry.root(), Arc::new(cache));
//!
//! let query = QueryBuilder::new()
//!     .descendants()
//!     .filter(context(attributes(has_attribute("name", "users".to_string()))))
//!     .build();
//! let node = registry.query_for_singleton(query.as_ref()).unwrap();
//! assert!(node.context().identifier().is::<Cache>());
//! ```
#![deny(missing_docs)]

mod element;
pub use self::element::{AttributeValue, Attributes, ContextElement, Identifier, LazyContextElement};

mod error;
pub use self::error::QueryError;

pub mod matchers;
pub use self::matchers::Matcher;

mod node;
pub use self::node::TreeNode;

pub mod query;
pub use self::query::{Query, QueryBuilder};

mod registry;
pub use self::registry::ContextRegistry;
