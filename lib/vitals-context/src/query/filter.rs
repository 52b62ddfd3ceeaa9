use std::{collections::HashSet, fmt};

use super::Query;
use crate::{Matcher, TreeNode};

/// Keeps the input nodes accepted by a matcher.
///
/// Each node is handed to the matcher as a [`TreeNode`].
pub struct Filter<M> {
    matcher: M,
}

impl<M> Filter<M> {
    /// Creates a new `Filter` using the given matcher.
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }
}

impl<M> Query for Filter<M>
where
    M: Matcher,
{
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        input
            .iter()
            .filter(|node| self.matcher.matches(*node))
            .cloned()
            .collect()
    }
}

impl<M> fmt::Display for Filter<M>
where
    M: Matcher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter for nodes with {}", self.matcher)
    }
}
