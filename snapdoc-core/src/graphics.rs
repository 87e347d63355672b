//! Content-stream graphics operations: bitmap placement and simple strokes.

use crate::error::Result;
use std::fmt::Write;

/// Device color for stroking and filling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb(f64, f64, f64),
    Gray(f64),
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb(r, g, b)
    }

    pub fn gray(level: f64) -> Self {
        Color::Gray(level)
    }

    pub fn black() -> Self {
        Color::Gray(0.0)
    }
}

/// Accumulates graphics operations for one page.
///
/// Coordinates are PDF device space: origin at the lower-left corner,
/// y increasing upward.
#[derive(Debug, Clone)]
pub struct GraphicsContext {
    operations: String,
    stroke_color: Color,
}

impl Default for GraphicsContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext {
    pub fn new() -> Self {
        Self {
            operations: String::new(),
            stroke_color: Color::black(),
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        writeln!(&mut self.operations, "{x:.2} {y:.2} m").expect("write to string");
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        writeln!(&mut self.operations, "{x:.2} {y:.2} l").expect("write to string");
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        writeln!(&mut self.operations, "{width:.2} w").expect("write to string");
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.stroke_color = color;
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        match self.stroke_color {
            Color::Rgb(r, g, b) => {
                writeln!(&mut self.operations, "{r:.3} {g:.3} {b:.3} RG").expect("write to string")
            }
            Color::Gray(level) => {
                writeln!(&mut self.operations, "{level:.3} G").expect("write to string")
            }
        }
        self.operations.push_str("S\n");
        self
    }

    /// Paints a named image XObject into the given rectangle.
    ///
    /// The image unit square is mapped onto the rectangle with a single
    /// transform, bracketed by a state save/restore so the transform does
    /// not leak into later operations.
    pub fn draw_image(
        &mut self,
        image_name: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> &mut Self {
        self.operations.push_str("q\n");
        writeln!(
            &mut self.operations,
            "{width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm"
        )
        .expect("write to string");
        writeln!(&mut self.operations, "/{image_name} Do").expect("write to string");
        self.operations.push_str("Q\n");
        self
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub(crate) fn generate_operations(&self) -> Result<Vec<u8>> {
        Ok(self.operations.as_bytes().to_vec())
    }
}
