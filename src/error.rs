//! Error types for tree construction, layout, and rendering.
//!
//! Every failure is a caller input error. Nothing is retried and nothing is
//! partially drawn: a tree that fails validation never reaches the layout
//! engine.

use thiserror::Error;

use crate::tree::NodeId;

/// A structural invariant of the input tree does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedTreeError {
    #[error("duplicate node id: {id}")]
    DuplicateId { id: NodeId },

    #[error("node {id} has depth {depth}, expected a non-negative integer")]
    InvalidDepth { id: NodeId, depth: f64 },

    #[error("node {id} has depth {depth}, expected {expected}")]
    DepthMismatch { id: NodeId, depth: u32, expected: u32 },

    #[error("root {id} has depth {depth}, expected 0")]
    RootDepth { id: NodeId, depth: u32 },

    #[error("root {id} declares parent {parent_id}")]
    RootHasParent { id: NodeId, parent_id: NodeId },

    #[error("node {id} declares parent {declared:?} but is nested under {actual}")]
    ParentMismatch {
        id: NodeId,
        declared: Option<NodeId>,
        actual: NodeId,
    },

    #[error("node table has no root row")]
    NoRoot,

    #[error("node table has more than one root: {first} and {second}")]
    MultipleRoots { first: NodeId, second: NodeId },

    #[error("node {id} references unknown parent {parent_id}")]
    UnknownParent { id: NodeId, parent_id: NodeId },

    #[error("node {id} is not reachable from the root")]
    Unreachable { id: NodeId },
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed tree: {0}")]
    Malformed(#[from] MalformedTreeError),

    #[error("cannot lay out an empty tree")]
    EmptyTree,

    #[error("invalid layout config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("invalid tree json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("canvas operation failed: {0}")]
    Canvas(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_converts_into_error() {
        let err: Error = MalformedTreeError::DuplicateId { id: "x".into() }.into();
        assert!(matches!(err, Error::Malformed(MalformedTreeError::DuplicateId { .. })));
        assert_eq!(err.to_string(), "malformed tree: duplicate node id: x");
    }

    #[test]
    fn test_depth_mismatch_message() {
        let err = MalformedTreeError::DepthMismatch {
            id: "b".into(),
            depth: 1,
            expected: 2,
        };
        assert_eq!(err.to_string(), "node b has depth 1, expected 2");
    }
}
