//! Node type and read-only tree queries.
//!
//! A `TreeNode` is immutable once built. Each node has:
//! - A stable identifier (unique across the whole tree)
//! - The identifier of its parent (None for the root)
//! - A depth (0 at the root, +1 per edge)
//! - An ordered list of children
//! - A radius derived from its child count

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Stable node identifier.
///
/// Opaque to the layout; only compared for equality and used as the label
/// text. JSON input may carry it as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Self(text),
            Repr::Integer(n) => Self(n.to_string()),
            // JS numbers arrive as f64; 3.0 is the id "3"
            Repr::Float(n) if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 => {
                Self((n as i64).to_string())
            }
            Repr::Float(n) => Self(n.to_string()),
        })
    }
}

/// A validated tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub(crate) id: NodeId,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) depth: u32,
    pub(crate) radius: f64,
    pub(crate) children: Vec<TreeNode>,
}

impl TreeNode {
    #[inline]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[inline]
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Drawn radius, larger for nodes with more direct children.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Iterate over direct children in insertion order.
    #[inline]
    pub fn children(&self) -> Children<'_> {
        Children {
            inner: self.children.iter(),
        }
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn children_slice(&self) -> &[TreeNode] {
        &self.children
    }

    /// Pre-order walk over this node and all its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Find the node with the given id in this subtree.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.walk().find(|node| node.id.as_str() == id)
    }

    /// All nodes at `depth`, in pre-order (first visited first).
    pub fn nodes_at_depth(&self, depth: u32) -> Vec<&TreeNode> {
        self.walk().filter(|node| node.depth == depth).collect()
    }

    /// Depth of the deepest node in this subtree.
    pub fn max_depth(&self) -> u32 {
        self.walk().map(|node| node.depth).max().unwrap_or(self.depth)
    }

    /// Route from the node with `id` up to this node, both included.
    ///
    /// Returns `[target, parent, ..., self]`, or None if `id` is not in this
    /// subtree.
    pub fn path_to_root(&self, id: &str) -> Option<Vec<&TreeNode>> {
        // Each entry carries its distance from `self`; `path` holds the
        // ancestors of the popped node.
        let mut path: Vec<&TreeNode> = Vec::new();
        let mut stack = vec![(self, 0usize)];
        while let Some((node, level)) = stack.pop() {
            path.truncate(level);
            path.push(node);
            if node.id.as_str() == id {
                path.reverse();
                return Some(path);
            }
            stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
        }
        None
    }

    /// Serialize the tree (with derived radii) as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::pretty(&mut out);
        self.serialize(serde_stacker::Serializer::new(&mut ser))?;
        String::from_utf8(out)
            .map_err(|err| <serde_json::Error as serde::ser::Error>::custom(err).into())
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl<'a> IntoIterator for &'a TreeNode {
    type Item = &'a TreeNode;
    type IntoIter = Children<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.children()
    }
}

/// Forward iterator over a node's direct children.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    inner: slice::Iter<'a, TreeNode>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a TreeNode;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

/// Pre-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl FusedIterator for Walk<'_> {}
