use std::{
    collections::HashSet,
    fmt, hash,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::ContextElement;

struct NodeInner {
    context: Arc<dyn ContextElement>,
    children: Mutex<HashSet<TreeNode>>,
}

/// A node in the context tree.
///
/// `TreeNode` is a cheap, shared handle: clones refer to the same node, and nodes compare equal (and hash) by identity
/// rather than by the contents of their context element. Children can be added and removed through any handle.
#[derive(Clone)]
pub struct TreeNode {
    inner: Arc<NodeInner>,
}

impl TreeNode {
    /// Creates a new `TreeNode` for the given context element, with no children.
    pub fn new(context: Arc<dyn ContextElement>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                context,
                children: Mutex::new(HashSet::new()),
            }),
        }
    }

    fn children_mut(&self) -> MutexGuard<'_, HashSet<TreeNode>> {
        self.inner.children.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a child to this node.
    ///
    /// Returns `false` if the node was already a child of this node.
    pub fn add_child(&self, child: TreeNode) -> bool {
        self.children_mut().insert(child)
    }

    /// Removes a child from this node.
    ///
    /// Returns `false` if the node was not a child of this node.
    pub fn remove_child(&self, child: &TreeNode) -> bool {
        self.children_mut().remove(child)
    }

    /// Returns the current children of this node.
    pub fn children(&self) -> HashSet<TreeNode> {
        self.children_mut().clone()
    }

    /// Returns the context element of this node.
    pub fn context(&self) -> Arc<dyn ContextElement> {
        Arc::clone(&self.inner.context)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for TreeNode {}

impl hash::Hash for TreeNode {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("identifier", &self.inner.context.identifier())
            .field("children", &self.children_mut().len())
            .finish()
    }
}
