//! Layout configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top margin used when the anchor is derived from a viewport width.
pub const DEFAULT_TOP_MARGIN: f64 = 100.0;

/// A point on the drawing surface (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where edges attach to the node circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeAnchor {
    /// Center-to-center edges.
    Center,
    /// Edges trimmed by each node's radius along the center line.
    #[default]
    Perimeter,
}

/// Configuration for tree construction and layout.
///
/// Deserializes from a partial camelCase object; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Radius of a leaf node.
    pub base_radius: f64,
    /// Divisor in `base + base * child_count / scale`.
    pub radius_scale_factor: f64,
    /// Horizontal gap between neighbouring children (before depth spread).
    pub horizontal_spacing: f64,
    /// Fixed row height between a parent and its children.
    pub vertical_spacing: f64,
    /// Extra fan-out per level below the first: `1 + depth_spread * (depth - 1)`.
    pub depth_spread: f64,
    /// Where the root is placed.
    pub anchor: Point,
    /// Edge attachment mode.
    pub edge_anchor: EdgeAnchor,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 7.5,
            radius_scale_factor: 5.0,
            horizontal_spacing: 40.0,
            vertical_spacing: 60.0,
            depth_spread: 0.25,
            anchor: Point::new(480.0, DEFAULT_TOP_MARGIN),
            edge_anchor: EdgeAnchor::Perimeter,
        }
    }
}

impl LayoutConfig {
    /// Default configuration with the root centered in a viewport of `width`.
    pub fn for_viewport(width: f64) -> Self {
        Self {
            anchor: Point::new(width / 2.0, DEFAULT_TOP_MARGIN),
            ..Default::default()
        }
    }

    /// Fan-out multiplier for nodes at `depth`.
    #[inline]
    pub fn spread(&self, depth: u32) -> f64 {
        1.0 + self.depth_spread * f64::from(depth.saturating_sub(1))
    }

    /// Check that every tunable is usable by the layout.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("baseRadius", self.base_radius),
            ("radiusScaleFactor", self.radius_scale_factor),
            ("horizontalSpacing", self.horizontal_spacing),
            ("verticalSpacing", self.vertical_spacing),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig { field, value });
            }
        }

        let non_negative = [
            ("depthSpread", self.depth_spread),
            ("anchor.x", self.anchor.x),
            ("anchor.y", self.anchor.y),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig { field, value });
            }
        }
        Ok(())
    }
}
