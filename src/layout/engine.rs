//! Recursive top-down node-link layout.
//!
//! Places the root at the configured anchor, then walks the tree depth-first.
//! At every node the ordered children are split into two halves:
//!
//! - `children[..ceil(n / 2)]` goes to the **left** of the parent,
//! - `children[ceil(n / 2)..]` goes to the **right**,
//!
//! with half-local index 0 nearest the parent. Within a half, offsets are
//! cumulative: each child sits one spacing step plus both radii beyond its
//! neighbour, and the step widens with depth. Left positions are clamped at
//! x = 0. Each row sits below its parent by the row height plus a term in the
//! child's radius and depth, so `y(child) > y(parent)` always holds.
//!
//! The clamp and the per-parent spacing do not guarantee that unrelated
//! branches stay apart on wide trees; `Placement::overlapping_pairs` reports
//! where they collide.

use tracing::{debug, enabled, instrument, Level};

use super::commands::DrawCommand;
use super::config::{EdgeAnchor, LayoutConfig};
use crate::error::{Error, Result};
use crate::spatial::SpatialIndex;
use crate::tree::{NodeId, RawNode, TreeBuilder, TreeNode};

/// A node with its assigned position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub id: NodeId,
    /// Index of the parent in `Placement::nodes` (None for the root).
    pub parent: Option<usize>,
    pub depth: u32,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Positions for every node of a tree, in emission (pre-order) order.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    nodes: Vec<PlacedNode>,
    edge_anchor: EdgeAnchor,
}

impl Placement {
    /// Placed nodes; index 0 is the root and parents precede their children.
    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&PlacedNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    pub fn parent_of(&self, node: &PlacedNode) -> Option<&PlacedNode> {
        node.parent.map(|index| &self.nodes[index])
    }

    /// Bounding box of all node circles as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.nodes.iter().fold(None, |acc, n| {
            let (x0, y0, x1, y1) = (n.x - n.radius, n.y - n.radius, n.x + n.radius, n.y + n.radius);
            Some(match acc {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            })
        })
    }

    /// R-tree over the node circles; item slots index into `nodes()`.
    pub fn spatial_index(&self) -> SpatialIndex {
        SpatialIndex::from_circles(self.nodes.iter().map(|n| (n.x, n.y, n.radius)))
    }

    /// The topmost (last drawn) node whose circle contains `(x, y)`.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&PlacedNode> {
        self.spatial_index().hit(x, y).map(|slot| &self.nodes[slot])
    }

    /// Pairs of nodes whose circles intersect, ordered by emission index.
    pub fn overlapping_pairs(&self) -> Vec<(&NodeId, &NodeId)> {
        self.spatial_index()
            .overlapping_pairs()
            .into_iter()
            .map(|(a, b)| (&self.nodes[a].id, &self.nodes[b].id))
            .collect()
    }

    /// The ordered draw command list.
    ///
    /// The root emits `Node` and `Label`; every other node emits `Node`,
    /// `Label` and then the `Edge` from its parent, before any of its own
    /// descendants.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.nodes.len() * 3);
        for node in &self.nodes {
            commands.push(DrawCommand::Node {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                radius: node.radius,
            });
            commands.push(DrawCommand::Label {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
            });
            if let Some(parent) = self.parent_of(node) {
                commands.push(self.edge(parent, node));
            }
        }
        commands
    }

    fn edge(&self, from: &PlacedNode, to: &PlacedNode) -> DrawCommand {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = dx.hypot(dy);

        let (from_x, from_y, to_x, to_y) = match self.edge_anchor {
            EdgeAnchor::Perimeter if length > from.radius + to.radius => {
                let (ux, uy) = (dx / length, dy / length);
                (
                    from.x + ux * from.radius,
                    from.y + uy * from.radius,
                    to.x - ux * to.radius,
                    to.y - uy * to.radius,
                )
            }
            // Overlapping circles have no visible gap to trim into.
            _ => (from.x, from.y, to.x, to.y),
        };

        DrawCommand::Edge {
            from_x,
            from_y,
            to_x,
            to_y,
        }
    }
}

/// The layout engine.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create a layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// A tree builder whose radii match this engine's configuration.
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::from_config(&self.config)
    }

    /// Assign a position to every node.
    ///
    /// Fails with `Error::EmptyTree` when `root` is None.
    #[instrument(level = "debug", skip_all)]
    pub fn place<'a>(&self, root: impl Into<Option<&'a TreeNode>>) -> Result<Placement> {
        let root = root.into().ok_or(Error::EmptyTree)?;

        let mut nodes = Vec::with_capacity(root.len());
        nodes.push(PlacedNode {
            id: root.id().clone(),
            parent: None,
            depth: root.depth(),
            x: self.config.anchor.x,
            y: self.config.anchor.y,
            radius: root.radius(),
        });

        // (node, parent slot in `nodes`, x); popped in pre-order.
        let mut pending: Vec<(&TreeNode, usize, f64)> = Vec::new();
        self.push_children(root, 0, self.config.anchor.x, &mut pending);
        while let Some((node, parent, x)) = pending.pop() {
            let y = nodes[parent].y
                + self.config.vertical_spacing
                + node.radius() * self.config.spread(node.depth());

            let index = nodes.len();
            nodes.push(PlacedNode {
                id: node.id().clone(),
                parent: Some(parent),
                depth: node.depth(),
                x,
                y,
                radius: node.radius(),
            });
            self.push_children(node, index, x, &mut pending);
        }

        let placement = Placement {
            nodes,
            edge_anchor: self.config.edge_anchor,
        };
        debug!(nodes = placement.len(), bounds = ?placement.bounds(), "placed tree");
        if enabled!(Level::DEBUG) {
            let overlaps = placement.overlapping_pairs();
            if !overlaps.is_empty() {
                debug!(count = overlaps.len(), first = ?overlaps[0], "layout has overlapping nodes");
            }
        }
        Ok(placement)
    }

    /// Lay out `root` and return the ordered draw commands.
    pub fn layout<'a>(&self, root: impl Into<Option<&'a TreeNode>>) -> Result<Vec<DrawCommand>> {
        Ok(self.place(root)?.draw_commands())
    }

    /// Build and lay out a raw record in one step.
    pub fn layout_raw(&self, raw: Option<&RawNode>) -> Result<Vec<DrawCommand>> {
        let raw = raw.ok_or(Error::EmptyTree)?;
        let tree = self.tree_builder().build(raw)?;
        self.layout(&tree)
    }

    /// Parse, build and lay out a JSON tree. JSON `null` is an empty tree.
    pub fn layout_json(&self, json: &str) -> Result<Vec<DrawCommand>> {
        let tree = self.tree_builder().build_json(json)?;
        self.layout(tree.as_ref())
    }

    /// Queue the children of `parent` with their x positions, first child on top.
    fn push_children<'a>(
        &self,
        parent: &'a TreeNode,
        parent_index: usize,
        parent_x: f64,
        pending: &mut Vec<(&'a TreeNode, usize, f64)>,
    ) {
        let children = parent.children_slice();
        let (first_half, second_half) = children.split_at(children.len().div_ceil(2));

        let left = self
            .half_offsets(first_half)
            .into_iter()
            .map(|offset| (parent_x - offset).max(0.0));
        let right = self
            .half_offsets(second_half)
            .into_iter()
            .map(|offset| parent_x + offset);

        let placed: Vec<(&'a TreeNode, usize, f64)> = children
            .iter()
            .zip(left.chain(right))
            .map(|(child, x)| (child, parent_index, x))
            .collect();
        pending.extend(placed.into_iter().rev());
    }

    /// Distance from the parent's x for each child of one half.
    ///
    /// `m_0 = step + r_0`, `m_i = m_{i-1} + r_{i-1} + step + r_i`.
    fn half_offsets(&self, half: &[TreeNode]) -> Vec<f64> {
        let mut offsets = Vec::with_capacity(half.len());
        // Outer edge of the previous sibling, measured from the parent.
        let mut reach = 0.0;
        for child in half {
            let step = self.config.horizontal_spacing * self.config.spread(child.depth());
            let offset = reach + step + child.radius();
            offsets.push(offset);
            reach = offset + child.radius();
        }
        offsets
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;

    /// Root with `count` leaf children named c0, c1, ...
    fn fan(count: usize) -> TreeNode {
        let root = RawNode::root("root");
        let children = (0..count).map(|i| root.child(format!("c{i}"))).collect();
        TreeBuilder::new()
            .build(&root.clone().with_children(children))
            .unwrap()
    }

    fn engine_at(x: f64, y: f64) -> LayoutEngine {
        LayoutEngine::new(LayoutConfig {
            anchor: Point::new(x, y),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_single_node() {
        let tree = TreeBuilder::new().build(&RawNode::root("solo")).unwrap();
        let commands = engine_at(300.0, 50.0).layout(&tree).unwrap();

        assert_eq!(
            commands,
            vec![
                DrawCommand::Node {
                    id: "solo".into(),
                    x: 300.0,
                    y: 50.0,
                    radius: 7.5
                },
                DrawCommand::Label {
                    id: "solo".into(),
                    x: 300.0,
                    y: 50.0
                },
            ]
        );
    }

    #[test]
    fn test_empty_tree() {
        let engine = LayoutEngine::with_defaults();
        assert!(matches!(engine.layout(None::<&TreeNode>), Err(Error::EmptyTree)));
        assert!(matches!(engine.layout_raw(None), Err(Error::EmptyTree)));
        assert!(matches!(engine.layout_json("null"), Err(Error::EmptyTree)));
    }

    #[test]
    fn test_two_children_positions() {
        let tree = fan(2);
        let placement = engine_at(500.0, 100.0).place(&tree).unwrap();

        // One child per half, each one step plus its radius from the parent.
        let left = placement.get("c0").unwrap();
        let right = placement.get("c1").unwrap();
        assert_eq!(left.x, 500.0 - (40.0 + 7.5));
        assert_eq!(right.x, 500.0 + (40.0 + 7.5));
        assert_eq!(left.y, 100.0 + 60.0 + 7.5);
        assert_eq!(right.y, left.y);
    }

    #[test]
    fn test_offsets_are_cumulative_within_half() {
        let tree = fan(4);
        let placement = engine_at(500.0, 100.0).place(&tree).unwrap();

        let xs: Vec<f64> = ["c0", "c1", "c2", "c3"]
            .iter()
            .map(|id| placement.get(id).unwrap().x)
            .collect();
        // m_0 = 47.5, m_1 = 47.5 + 7.5 + 40 + 7.5 = 102.5
        assert_eq!(xs, vec![452.5, 397.5, 547.5, 602.5]);
    }

    #[test]
    fn test_deeper_rows_fan_out_wider() {
        let root = RawNode::root("r");
        let a = root.child("a");
        let a = a.clone().with_children(vec![a.child("a0"), a.child("a1")]);
        let raw = root.clone().with_children(vec![a]);
        let tree = TreeBuilder::new().build(&raw).unwrap();
        let placement = engine_at(500.0, 100.0).place(&tree).unwrap();

        let a = placement.get("a").unwrap();
        let a1 = placement.get("a1").unwrap();
        // depth 2 spreads by 1.25: step 50, dy = 60 + 7.5 * 1.25
        assert_eq!(a1.x - a.x, 50.0 + 7.5);
        assert_eq!(a1.y - a.y, 60.0 + 7.5 * 1.25);
    }

    #[test]
    fn test_left_half_clamped_at_zero() {
        let tree = fan(9);
        let placement = engine_at(60.0, 100.0).place(&tree).unwrap();
        assert!(placement.nodes().iter().all(|n| n.x >= 0.0));
        assert_eq!(placement.get("c4").unwrap().x, 0.0);
    }

    #[test]
    fn test_emission_is_depth_first() {
        let root = RawNode::root("r");
        let a = root.child("a");
        let a = a.clone().with_children(vec![a.child("a0")]);
        let raw = root.clone().with_children(vec![a, root.child("b")]);
        let tree = TreeBuilder::new().build(&raw).unwrap();
        let commands = LayoutEngine::with_defaults().layout(&tree).unwrap();

        let order: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Node { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["r", "a", "a0", "b"]);

        // Node, Label, then the edge from its parent.
        assert!(commands[2].is_node());
        assert!(commands[3].is_label());
        assert!(commands[4].is_edge());
        assert_eq!(commands.iter().filter(|c| c.is_edge()).count(), 3);
    }

    #[test]
    fn test_edge_anchor_modes() {
        let tree = fan(1);

        let center = LayoutEngine::new(LayoutConfig {
            edge_anchor: EdgeAnchor::Center,
            ..Default::default()
        })
        .unwrap();
        let placement = center.place(&tree).unwrap();
        let child = placement.get("c0").unwrap().clone();
        let edge = placement.draw_commands().into_iter().find(|c| c.is_edge()).unwrap();
        assert_eq!(
            edge,
            DrawCommand::Edge {
                from_x: 480.0,
                from_y: 100.0,
                to_x: child.x,
                to_y: child.y
            }
        );

        let perimeter = LayoutEngine::with_defaults().place(&tree).unwrap();
        let root = perimeter.root().unwrap().clone();
        let child = perimeter.get("c0").unwrap().clone();
        let Some(DrawCommand::Edge {
            from_x,
            from_y,
            to_x,
            to_y,
        }) = perimeter.draw_commands().into_iter().find(|c| c.is_edge())
        else {
            panic!("expected an edge");
        };
        let start = (from_x - root.x).hypot(from_y - root.y);
        let end = (to_x - child.x).hypot(to_y - child.y);
        assert!((start - root.radius).abs() < 1e-9, "start {start}");
        assert!((end - child.radius).abs() < 1e-9, "end {end}");
    }

    #[test]
    fn test_bounds_and_hit_testing() {
        let tree = fan(2);
        let placement = engine_at(500.0, 100.0).place(&tree).unwrap();

        let (min_x, min_y, max_x, _) = placement.bounds().unwrap();
        assert_eq!(min_x, 452.5 - 7.5);
        assert_eq!(max_x, 547.5 + 7.5);
        assert_eq!(min_y, 100.0 - tree.radius());

        assert_eq!(placement.node_at(501.0, 101.0).unwrap().id.as_str(), "root");
        assert_eq!(placement.node_at(547.5, 167.5).unwrap().id.as_str(), "c1");
        assert!(placement.node_at(10.0, 10.0).is_none());
    }

    #[test]
    fn test_clamped_fan_reports_overlaps() {
        let placement = engine_at(0.0, 100.0).place(&fan(6)).unwrap();
        let overlaps = placement.overlapping_pairs();
        // c0, c1 and c2 all collapse onto x = 0.
        assert!(overlaps.contains(&(&NodeId::new("c0"), &NodeId::new("c1"))));
        assert_eq!(overlaps.len(), 3);
    }

    #[test]
    fn test_deep_chain_places_every_level() {
        let rows: Vec<(u32, Option<u32>)> = (0..20_000u32)
            .map(|i| (i, i.checked_sub(1)))
            .collect();
        let tree = TreeBuilder::new().from_records(&rows).unwrap();
        let placement = LayoutEngine::with_defaults().place(&tree).unwrap();

        assert_eq!(placement.len(), 20_000);
        for (index, node) in placement.nodes().iter().enumerate().skip(1) {
            let parent = placement.parent_of(node).unwrap();
            assert_eq!(node.parent, Some(index - 1));
            assert!(node.y > parent.y);
            // A single child always lands in the left half.
            let offset = 40.0 * LayoutConfig::default().spread(node.depth) + node.radius;
            assert_eq!(node.x, (parent.x - offset).max(0.0));
        }
        assert_eq!(placement.draw_commands().len(), 3 * 20_000 - 1);
    }
}
