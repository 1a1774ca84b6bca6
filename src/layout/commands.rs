//! Draw commands emitted by the layout engine.
//!
//! The command list is the whole contract with a rendering surface: replaying
//! it in order reproduces the diagram.

use serde::Serialize;

use crate::tree::NodeId;

/// One drawing step.
///
/// Serializes as `{ "kind": "node" | "edge" | "label", ... }` with camelCase
/// fields (`fromX`, `toY`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    /// Filled node circle.
    Node {
        id: NodeId,
        x: f64,
        y: f64,
        radius: f64,
    },
    /// Straight parent → child line.
    Edge {
        from_x: f64,
        from_y: f64,
        to_x: f64,
        to_y: f64,
    },
    /// Node label centered at (x, y).
    Label { id: NodeId, x: f64, y: f64 },
}

impl DrawCommand {
    #[inline]
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node { .. })
    }

    #[inline]
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::Edge { .. })
    }

    #[inline]
    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let edge = DrawCommand::Edge {
            from_x: 1.0,
            from_y: 2.0,
            to_x: 3.0,
            to_y: 4.0,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "edge", "fromX": 1.0, "fromY": 2.0, "toX": 3.0, "toY": 4.0 })
        );

        let label = DrawCommand::Label {
            id: "a".into(),
            x: 5.0,
            y: 6.0,
        };
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "label", "id": "a", "x": 5.0, "y": 6.0 }));
    }

    #[test]
    fn test_kind_predicates() {
        let node = DrawCommand::Node {
            id: "a".into(),
            x: 0.0,
            y: 0.0,
            radius: 7.5,
        };
        assert!(node.is_node());
        assert!(!node.is_edge());
        assert!(!node.is_label());
    }
}
