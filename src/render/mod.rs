//! Replaying draw commands onto a drawing surface.
//!
//! The layout engine never touches a surface. Callers pass one in through
//! the `Canvas2D` capability when they want the commands executed.

mod html;

pub use html::{CanvasStyle, HtmlCanvas};

use crate::layout::DrawCommand;

/// The three drawing primitives a node-link diagram needs.
pub trait Canvas2D {
    type Error;

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) -> Result<(), Self::Error>;

    fn stroke_line(&mut self, from_x: f64, from_y: f64, to_x: f64, to_y: f64)
    -> Result<(), Self::Error>;

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

/// Execute `commands` in order, stopping at the first surface error.
pub fn replay<C>(commands: &[DrawCommand], canvas: &mut C) -> Result<(), C::Error>
where
    C: Canvas2D + ?Sized,
{
    for command in commands {
        match command {
            DrawCommand::Node { x, y, radius, .. } => canvas.fill_circle(*x, *y, *radius)?,
            DrawCommand::Edge {
                from_x,
                from_y,
                to_x,
                to_y,
            } => canvas.stroke_line(*from_x, *from_y, *to_x, *to_y)?,
            DrawCommand::Label { id, x, y } => canvas.fill_text(id.as_str(), *x, *y)?,
        }
    }
    Ok(())
}
