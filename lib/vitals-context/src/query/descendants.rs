use std::{collections::HashSet, fmt};

use super::{Children, Query};
use crate::TreeNode;

/// Selects every node reachable from the input nodes, excluding the input nodes themselves unless they are also
/// reachable from another input node.
///
/// The tree is walked one generation at a time, and only nodes not already seen are expanded further, so this also
/// terminates if the nodes happen to form a cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Descendants;

impl Query for Descendants {
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        let mut descendants = HashSet::new();
        let mut frontier = Children.execute(input);
        while !frontier.is_empty() {
            let unseen = frontier
                .into_iter()
                .filter(|node| descendants.insert(node.clone()))
                .collect::<HashSet<_>>();
            frontier = Children.execute(&unseen);
        }
        descendants
    }
}

impl fmt::Display for Descendants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("descendants")
    }
}
