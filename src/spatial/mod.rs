//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over placed node
//! circles for hit testing and overlap detection.

mod rtree;

pub use rtree::{NodeCircle, SpatialIndex};
