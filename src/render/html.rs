//! `Canvas2D` over an HTML canvas 2D context.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::Canvas2D;
use crate::error::Error;

/// Colors and font used on the HTML canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStyle {
    pub node_fill: String,
    pub edge_stroke: String,
    pub label_fill: String,
    pub font: String,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            node_fill: "#021225".to_owned(),
            edge_stroke: "#021225".to_owned(),
            label_fill: "white".to_owned(),
            font: "bold 10pt Calibri".to_owned(),
        }
    }
}

/// Borrowed 2D context; the caller keeps ownership of the canvas.
pub struct HtmlCanvas<'a> {
    ctx: &'a CanvasRenderingContext2d,
    style: CanvasStyle,
}

impl<'a> HtmlCanvas<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self::with_style(ctx, CanvasStyle::default())
    }

    pub fn with_style(ctx: &'a CanvasRenderingContext2d, style: CanvasStyle) -> Self {
        Self { ctx, style }
    }
}

fn js_error(value: JsValue) -> Error {
    Error::Canvas(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

impl Canvas2D for HtmlCanvas<'_> {
    type Error = Error;

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) -> Result<(), Error> {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(&self.style.node_fill);
        self.ctx.arc(x, y, radius, 0.0, TAU).map_err(js_error)?;
        self.ctx.fill();
        Ok(())
    }

    fn stroke_line(&mut self, from_x: f64, from_y: f64, to_x: f64, to_y: f64) -> Result<(), Error> {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&self.style.edge_stroke);
        self.ctx.move_to(from_x, from_y);
        self.ctx.line_to(to_x, to_y);
        self.ctx.stroke();
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Error> {
        self.ctx.set_font(&self.style.font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&self.style.label_fill);
        self.ctx.fill_text(text, x, y).map_err(js_error)
    }
}
