use std::{collections::HashSet, fmt, sync::Arc};

use tracing::debug;

use crate::{Attributes, ContextElement, Identifier, Query, QueryError, TreeNode};

struct RegistryRoot;

impl ContextElement for RegistryRoot {
    fn identifier(&self) -> Identifier {
        Identifier::of::<ContextRegistry>()
    }

    fn attributes(&self) -> Attributes {
        Attributes::new()
    }
}

/// The root of a context tree.
///
/// The registry owns a root node with no attributes. Elements registered directly under the root are the top-level
/// contexts (for example, one per cache), and everything else hangs below them. Queries run by the registry start from
/// the root node.
#[derive(Clone)]
pub struct ContextRegistry {
    root: TreeNode,
}

impl ContextRegistry {
    /// Creates a new, empty `ContextRegistry`.
    pub fn new() -> Self {
        Self {
            root: TreeNode::new(Arc::new(RegistryRoot)),
        }
    }

    /// Returns the root node.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Registers a context element as a child of `parent`, returning its node.
    pub fn register(&self, parent: &TreeNode, element: Arc<dyn ContextElement>) -> TreeNode {
        let identifier = element.identifier();
        let node = TreeNode::new(element);
        parent.add_child(node.clone());
        debug!(%identifier, parent = %parent.context().identifier(), "Registered context element.");
        node
    }

    /// Runs the query, starting from the root node.
    pub fn query(&self, query: &dyn Query) -> HashSet<TreeNode> {
        let matches = query.execute(&HashSet::from([self.root.clone()]));
        debug!(%query, matches = matches.len(), "Executed context query.");
        matches
    }

    /// Runs the query, starting from the root node, and returns the single node it matched.
    ///
    /// # Errors
    ///
    /// If the query matches no nodes, or more than one node, an error is returned.
    pub fn query_for_singleton(&self, query: &dyn Query) -> Result<TreeNode, QueryError> {
        let matches = self.query(query);
        let mut nodes = matches.into_iter();
        match (nodes.next(), nodes.len()) {
            (Some(node), 0) => Ok(node),
            (None, _) => Err(QueryError::NoMatch {
                query: query.to_string(),
            }),
            (Some(_), rest) => Err(QueryError::MultipleMatches {
                query: query.to_string(),
                matches: rest + 1,
            }),
        }
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextRegistry").field("root", &self.root).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        matchers::{context, identifier, subtype_of},
        LazyContextElement, QueryBuilder,
    };

    struct Cache;
    struct Tier;

    fn element<T: 'static>() -> Arc<dyn ContextElement> {
        Arc::new(LazyContextElement::new(Identifier::of::<T>()))
    }

    #[test]
    fn register_under_root_and_nested() {
        let registry = ContextRegistry::new();
        let cache = registry.register(registry.root(), element::<Cache>());
        let tier = registry.register(&cache, element::<Tier>());

        assert!(registry.root().children().contains(&cache));
        assert!(cache.children().contains(&tier));
        assert!(registry.root().context().identifier().is::<ContextRegistry>());
        assert!(registry.root().context().attributes().is_empty());
    }

    #[test]
    fn singleton_queries() {
        let registry = ContextRegistry::new();
        let cache = registry.register(registry.root(), element::<Cache>());
        registry.register(&cache, element::<Tier>());
        registry.register(&cache, element::<Tier>());

        let caches = QueryBuilder::new()
            .descendants()
            .filter(context(identifier(subtype_of::<Cache>())))
            .build();
        assert_eq!(registry.query_for_singleton(caches.as_ref()), Ok(cache));

        let tiers = QueryBuilder::new()
            .descendants()
            .filter(context(identifier(subtype_of::<Tier>())))
            .build();
        assert_eq!(registry.query(tiers.as_ref()).len(), 2);
        assert!(matches!(
            registry.query_for_singleton(tiers.as_ref()),
            Err(QueryError::MultipleMatches { matches: 2, .. })
        ));

        let nothing = QueryBuilder::new()
            .children()
            .filter(context(identifier(subtype_of::<Tier>())))
            .build();
        let error = registry.query_for_singleton(nothing.as_ref()).unwrap_err();
        assert_eq!(error, QueryError::NoMatch { query: nothing.to_string() });
        assert!(error.to_string().starts_with("Query 'children => filter for nodes with"));
    }
}
