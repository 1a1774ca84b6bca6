//! R-tree based spatial index over node circles using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Hit testing (which circle contains a point)
//! - Nearest circle
//! - Rectangle intersection
//! - Pairwise circle overlap

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A node circle with the slot it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeCircle {
    /// Index into the placement's node list.
    pub slot: usize,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl NodeCircle {
    pub fn new(slot: usize, x: f64, y: f64, radius: f64) -> Self {
        Self { slot, x, y, radius }
    }

    fn intersects(&self, other: &NodeCircle) -> bool {
        let reach = self.radius + other.radius;
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy < reach * reach
    }
}

impl RTreeObject for NodeCircle {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.radius, self.y - self.radius],
            [self.x + self.radius, self.y + self.radius],
        )
    }
}

impl PointDistance for NodeCircle {
    /// Squared distance from the point to the circle's edge (0 inside).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        let outside = (dx.hypot(dy) - self.radius).max(0.0);
        outside * outside
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Spatial index for placed nodes.
///
/// Uses an R*-tree for efficient spatial queries.
pub struct SpatialIndex {
    tree: RTree<NodeCircle>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load `(x, y, radius)` circles; slots follow iteration order.
    pub fn from_circles(circles: impl IntoIterator<Item = (f64, f64, f64)>) -> Self {
        let circles: Vec<_> = circles
            .into_iter()
            .enumerate()
            .map(|(slot, (x, y, radius))| NodeCircle::new(slot, x, y, radius))
            .collect();
        Self {
            tree: RTree::bulk_load(circles),
        }
    }

    /// Insert a circle into the index.
    pub fn insert(&mut self, circle: NodeCircle) {
        self.tree.insert(circle);
    }

    /// The highest slot whose circle contains the point.
    ///
    /// Later slots are drawn on top, so this is what a click lands on.
    pub fn hit(&self, x: f64, y: f64) -> Option<usize> {
        self.tree
            .locate_all_at_point(&[x, y])
            .map(|circle| circle.slot)
            .max()
    }

    /// Find the circle closest to a point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<usize> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|circle| circle.slot)
    }

    /// All slots whose bounding envelope intersects the rectangle, sorted.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<usize> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|circle| circle.slot)
            .collect();
        slots.sort_unstable();
        slots
    }

    /// Every `(a, b)` with `a < b` whose circles strictly intersect, sorted.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for circle in self.tree.iter() {
            for other in self.tree.locate_in_envelope_intersecting(&circle.envelope()) {
                if other.slot > circle.slot && circle.intersects(other) {
                    pairs.push((circle.slot, other.slot));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Get the number of circles in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
