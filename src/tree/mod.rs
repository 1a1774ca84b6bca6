//! Tree data structures and construction.
//!
//! This module turns caller-supplied nested records (or flat id/parent
//! tables) into immutable, validated `TreeNode` trees with per-node radii.

mod builder;
mod node;
mod records;

pub use builder::{RawNode, TreeBuilder};
pub use node::{Children, NodeId, TreeNode, Walk};
