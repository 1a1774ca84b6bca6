//! Heroine Tree - WASM Module
//!
//! This module lays out nested parent/child records as a top-down node-link
//! diagram and emits draw commands for a 2D canvas. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: Validated, immutable trees built from nested or flat records
//! - `layout`: Recursive left/right split layout producing draw commands
//! - `spatial`: R-tree index over placed nodes for hit testing and overlaps
//! - `render`: `Canvas2D` capability and command replay

use js_sys::Float64Array;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

pub mod error;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod tree;

pub use error::{Error, MalformedTreeError, Result};
pub use layout::{DrawCommand, EdgeAnchor, LayoutConfig, LayoutEngine, Placement, Point};
pub use render::{replay, Canvas2D, HtmlCanvas};
pub use tree::{NodeId, RawNode, TreeBuilder, TreeNode};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for tree visualization.
///
/// Holds only the layout configuration; every call builds and lays out a
/// fresh tree and the drawing context is passed in per call.
#[wasm_bindgen]
pub struct HeroineTreeWasm {
    engine: LayoutEngine,
}

#[wasm_bindgen]
impl HeroineTreeWasm {
    /// Create a layout engine from an optional partial config object.
    ///
    /// Recognized keys: `baseRadius`, `radiusScaleFactor`,
    /// `horizontalSpacing`, `verticalSpacing`, `depthSpread`,
    /// `anchor: { x, y }`, `edgeAnchor: "center" | "perimeter"`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<HeroineTreeWasm, JsError> {
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            engine: LayoutEngine::new(config)?,
        })
    }

    /// Default configuration with the root centered in a viewport of `width`.
    #[wasm_bindgen(js_name = forViewport)]
    pub fn for_viewport(width: f64) -> std::result::Result<HeroineTreeWasm, JsError> {
        Ok(Self {
            engine: LayoutEngine::new(LayoutConfig::for_viewport(width))?,
        })
    }

    /// Lay out a nested tree object and return its draw commands.
    ///
    /// Each command is `{ kind: "node", id, x, y, radius }`,
    /// `{ kind: "label", id, x, y }` or `{ kind: "edge", fromX, fromY, toX, toY }`.
    pub fn layout(&self, tree: JsValue) -> std::result::Result<JsValue, JsError> {
        let raw = tree_from_js(tree)?;
        let commands = self.engine.layout_raw(raw.as_ref())?;
        Ok(serde_wasm_bindgen::to_value(&commands)?)
    }

    /// Lay out a JSON tree and return the draw commands as JSON.
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self, json: &str) -> std::result::Result<String, JsError> {
        let commands = self.engine.layout_json(json)?;
        Ok(serde_json::to_string(&commands)?)
    }

    /// Node positions as a Float64Array `[x0, y0, x1, y1, ...]` in pre-order.
    #[wasm_bindgen(js_name = layoutPositions)]
    pub fn layout_positions(&self, tree: JsValue) -> std::result::Result<Float64Array, JsError> {
        let raw = tree_from_js(tree)?;
        let positions = self.positions(raw.as_ref())?;
        Ok(Float64Array::from(&positions[..]))
    }

    /// Lay out a nested tree object and draw it onto `ctx`.
    pub fn draw(
        &self,
        tree: JsValue,
        ctx: &CanvasRenderingContext2d,
    ) -> std::result::Result<(), JsError> {
        let raw = tree_from_js(tree)?;
        let commands = self.engine.layout_raw(raw.as_ref())?;
        replay(&commands, &mut HtmlCanvas::new(ctx))?;
        Ok(())
    }
}

impl HeroineTreeWasm {
    /// Native constructor for an already-validated engine.
    pub fn with_engine(engine: LayoutEngine) -> Self {
        Self { engine }
    }

    fn positions(&self, raw: Option<&RawNode>) -> Result<Vec<f64>> {
        let raw = raw.ok_or(Error::EmptyTree)?;
        let tree = self.engine.tree_builder().build(raw)?;
        let placement = self.engine.place(&tree)?;
        Ok(placement.nodes().iter().flat_map(|n| [n.x, n.y]).collect())
    }
}

/// Read a nested tree object, growing the stack for deep trees.
fn tree_from_js(tree: JsValue) -> std::result::Result<Option<RawNode>, serde_wasm_bindgen::Error> {
    let deserializer = serde_wasm_bindgen::Deserializer::from(tree);
    Option::<RawNode>::deserialize(serde_stacker::Deserializer::new(deserializer))
}

impl Default for HeroineTreeWasm {
    fn default() -> Self {
        Self::with_engine(LayoutEngine::with_defaults())
    }
}
