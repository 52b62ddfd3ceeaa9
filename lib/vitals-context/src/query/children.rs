use std::{collections::HashSet, fmt};

use super::Query;
use crate::TreeNode;

/// Selects the children of every input node.
#[derive(Clone, Copy, Debug, Default)]
pub struct Children;

impl Query for Children {
    fn execute(&self, input: &HashSet<TreeNode>) -> HashSet<TreeNode> {
        input.iter().flat_map(TreeNode::children).collect()
    }
}

impl fmt::Display for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("children")
    }
}
