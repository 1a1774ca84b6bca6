//! Layout algorithms for tree visualization.
//!
//! This module computes a position for every node of a validated tree and
//! turns the result into an ordered list of draw commands that a rendering
//! surface can replay.

mod commands;
mod config;
pub mod engine;

pub use commands::DrawCommand;
pub use config::{EdgeAnchor, LayoutConfig, Point, DEFAULT_TOP_MARGIN};
pub use engine::{LayoutEngine, PlacedNode, Placement};
