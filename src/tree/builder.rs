//! TreeBuilder: raw nested records → validated `TreeNode` trees.
//!
//! The input record mirrors the JSON shape handed over by the host page:
//! `{ id, parent_id, depth, children: [...] }`. Building walks it once,
//! checks every structural invariant, and derives each node's radius from its
//! resolved child count. Any violation aborts the whole build.

use std::collections::HashSet;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

use super::node::{NodeId, TreeNode};
use crate::error::{MalformedTreeError, Result};
use crate::layout::LayoutConfig;

/// Nested input record, exactly as supplied by the caller.
///
/// `depth` is kept as a raw number so that non-integer depths can be
/// reported instead of silently truncated. A missing or non-numeric depth
/// reads as NaN and is rejected by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default = "unknown_depth", deserialize_with = "lenient_depth")]
    pub depth: f64,
    #[serde(default)]
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(id: impl Into<NodeId>, parent_id: Option<NodeId>, depth: f64) -> Self {
        Self {
            id: id.into(),
            parent_id,
            depth,
            children: Vec::new(),
        }
    }

    /// A root record: no parent, depth 0.
    pub fn root(id: impl Into<NodeId>) -> Self {
        Self::new(id, None, 0.0)
    }

    /// A child record of `self`, with its parent id and depth filled in.
    pub fn child(&self, id: impl Into<NodeId>) -> Self {
        Self::new(id, Some(self.id.clone()), self.depth + 1.0)
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = children;
        self
    }
}

impl Drop for RawNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

fn unknown_depth() -> f64 {
    f64::NAN
}

fn lenient_depth<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Other(IgnoredAny),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Number(depth) => depth,
        Repr::Other(_) => f64::NAN,
    })
}

/// Parse JSON without serde_json's nesting limit, growing the stack on demand.
pub(crate) fn from_json_unbounded<T: DeserializeOwned>(json: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// A node whose children are still being built.
struct Frame<'a> {
    raw: &'a RawNode,
    depth: u32,
    next: usize,
    children: Vec<TreeNode>,
}

impl<'a> Frame<'a> {
    fn new(raw: &'a RawNode, depth: u32) -> Self {
        Self {
            raw,
            depth,
            next: 0,
            children: Vec::with_capacity(raw.children.len()),
        }
    }
}

/// Builds validated trees and assigns node radii.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    base_radius: f64,
    radius_scale_factor: f64,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl TreeBuilder {
    /// Create a builder with the default radius constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder whose radii agree with `config`, which must already
    /// be validated.
    pub(crate) fn from_config(config: &LayoutConfig) -> Self {
        Self {
            base_radius: config.base_radius,
            radius_scale_factor: config.radius_scale_factor,
        }
    }

    /// `base + base * child_count / scale`.
    pub fn radius_for(&self, child_count: usize) -> f64 {
        self.base_radius + self.base_radius * child_count as f64 / self.radius_scale_factor
    }

    /// Build a validated tree from a nested record.
    ///
    /// Fails with a `MalformedTreeError` on a duplicate id, a missing,
    /// non-integer or negative depth, a child whose depth is not its parent's plus one, a
    /// child whose `parent_id` does not name its parent, or a root that has a
    /// parent or a non-zero depth.
    #[instrument(level = "debug", skip_all, fields(root = %raw.id))]
    pub fn build(&self, raw: &RawNode) -> Result<TreeNode> {
        let depth = Self::depth_of(raw)?;
        if let Some(parent_id) = &raw.parent_id {
            return Err(MalformedTreeError::RootHasParent {
                id: raw.id.clone(),
                parent_id: parent_id.clone(),
            }
            .into());
        }
        if depth != 0 {
            return Err(MalformedTreeError::RootDepth {
                id: raw.id.clone(),
                depth,
            }
            .into());
        }

        let mut seen = HashSet::new();
        seen.insert(&raw.id);
        let tree = self.build_nodes(raw, &mut seen)?;
        debug!(nodes = seen.len(), max_depth = tree.max_depth(), "built tree");
        Ok(tree)
    }

    /// Parse a nested JSON record and build it. JSON `null` yields `None`.
    ///
    /// Nesting depth is unbounded.
    pub fn build_json(&self, json: &str) -> Result<Option<TreeNode>> {
        let raw: Option<RawNode> = from_json_unbounded(json)?;
        raw.as_ref().map(|raw| self.build(raw)).transpose()
    }

    /// Depth-first pass over an already checked root; children are checked
    /// in pre-order and nodes are assembled once all their children are.
    fn build_nodes<'a>(
        &self,
        root: &'a RawNode,
        seen: &mut HashSet<&'a NodeId>,
    ) -> std::result::Result<TreeNode, MalformedTreeError> {
        let mut ancestors: Vec<Frame<'a>> = Vec::new();
        let mut current = Frame::new(root, 0);
        loop {
            let raw = current.raw;
            if let Some(child) = raw.children.get(current.next) {
                current.next += 1;
                let depth = Self::child_depth(raw, current.depth, child)?;
                if !seen.insert(&child.id) {
                    return Err(MalformedTreeError::DuplicateId {
                        id: child.id.clone(),
                    });
                }
                ancestors.push(current);
                current = Frame::new(child, depth);
                continue;
            }

            let node = TreeNode {
                id: raw.id.clone(),
                parent_id: raw.parent_id.clone(),
                depth: current.depth,
                radius: self.radius_for(current.children.len()),
                children: current.children,
            };
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.children.push(node);
                    current = parent;
                }
                None => return Ok(node),
            }
        }
    }

    fn child_depth(
        parent: &RawNode,
        parent_depth: u32,
        child: &RawNode,
    ) -> std::result::Result<u32, MalformedTreeError> {
        let depth = Self::depth_of(child)?;
        let expected = parent_depth + 1;
        if depth != expected {
            return Err(MalformedTreeError::DepthMismatch {
                id: child.id.clone(),
                depth,
                expected,
            });
        }
        if child.parent_id.as_ref() != Some(&parent.id) {
            return Err(MalformedTreeError::ParentMismatch {
                id: child.id.clone(),
                declared: child.parent_id.clone(),
                actual: parent.id.clone(),
            });
        }
        Ok(depth)
    }

    fn depth_of(raw: &RawNode) -> std::result::Result<u32, MalformedTreeError> {
        let depth = raw.depth;
        if depth.is_finite() && depth.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&depth) {
            Ok(depth as u32)
        } else {
            Err(MalformedTreeError::InvalidDepth {
                id: raw.id.clone(),
                depth,
            })
        }
    }
}
