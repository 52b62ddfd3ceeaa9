//! Queries over the context tree.
//!
//! A [`Query`] maps a set of nodes to another set of nodes. Queries are composed left to right, each stage running
//! over the output of the previous one, which [`QueryBuilder`] takes care of:
//!
//! ```
//! use vitals_context::{matchers::{context, identifier, subtype_of}, QueryBuilder};
//!
//! struct Tier;
//!
//! let query = QueryBuilder::new()
//!     .descendants()
//!     .filter(context(identifier(subtype_of::<Tier>())))
//!     .children()
//!     .build();
//! assert!(query.to_string().starts_with("descendants => filter for nodes with context with"));
//! assert!(query.to_string().ends_with("=> children"));
//! ```
use std::{collections::HashSet, fmt};

use crate::{Matcher, TreeNode};

mod children;
pub use self::children::Children;

mod descendants;
pub use self::descendants::Descendants;

mod filter;
pub use self::filter::Filter;

/// A transformation from one set of nodes to another.
pub trait Query: fmt::Display + Send + Sync {
    /// Runs the query over the given nodes.
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode>;
}

impl<Q> Query for Box<Q>
where
    Q: Query + ?Sized,
{
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        (**self).execute(input)
    }
}

/// Returns its input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyQuery;

impl Query for EmptyQuery {
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        input.clone()
    }
}

impl fmt::Display for EmptyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("identity")
    }
}

/// Runs one query over the output of another.
pub struct Chain {
    first: Box<dyn Query>,
    second: Box<dyn Query>,
}

impl Chain {
    /// Creates a new `Chain` that runs `first`, and then `second` over its output.
    pub fn new(first: Box<dyn Query>, second: Box<dyn Query>) -> Self {
        Self { first, second }
    }
}

impl Query for Chain {
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        let intermediate = self.first.execute(input);
        self.second.execute(&intermediate)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.first, self.second)
    }
}

/// Builds a query out of a sequence of stages.
#[derive(Default)]
pub struct QueryBuilder {
    stages: Vec<Box<dyn Query>>,
}

impl QueryBuilder {
    /// Creates a new, empty `QueryBuilder`.
    ///
    /// Building it as-is gives a query that returns its input unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the children of the current nodes.
    pub fn children(self) -> Self {
        self.chain(Children)
    }

    /// Selects the descendants of the current nodes.
    pub fn descendants(self) -> Self {
        self.chain(Descendants)
    }

    /// Keeps the current nodes that match the given matcher.
    pub fn filter<M>(self, matcher: M) -> Self
    where
        M: Matcher + 'static,
    {
        self.chain(Filter::new(matcher))
    }

    /// Runs the given query over the current nodes.
    pub fn chain<Q>(mut self, query: Q) -> Self
    where
        Q: Query + 'static,
    {
        self.stages.push(Box::new(query));
        self
    }

    /// Builds the query.
    pub fn build(self) -> Box<dyn Query> {
        self.stages
            .into_iter()
            .reduce(|first, second| Box::new(Chain::new(first, second)) as Box<dyn Query>)
            .unwrap_or_else(|| Box::new(EmptyQuery))
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages = self.stages.iter().map(ToString::to_string).collect::<Vec<_>>();
        f.debug_struct("QueryBuilder").field("stages", &stages).finish()
    }
}
