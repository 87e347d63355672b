//! A single output page: placed block bitmaps plus optional header text.

use crate::error::{DocError, Result};
use crate::graphics::GraphicsContext;
use crate::raster::Bitmap;
use crate::text::TextContext;

/// One page of the output document.
///
/// Pages are built by the assembler: bitmaps are registered under a
/// resource name and painted through the graphics context; the page-1
/// cover header goes through the text context. A page never carries
/// layout state — the cursor lives with the assembler.
#[derive(Debug, Clone)]
pub struct Page {
    width: f64,
    height: f64,
    graphics_context: GraphicsContext,
    text_context: TextContext,
    bitmaps: Vec<(String, Bitmap)>,
}

impl Page {
    /// Creates a page with the given size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            graphics_context: GraphicsContext::new(),
            text_context: TextContext::new(),
            bitmaps: Vec::new(),
        }
    }

    /// Graphics operations for this page.
    pub fn graphics(&mut self) -> &mut GraphicsContext {
        &mut self.graphics_context
    }

    /// Text operations for this page.
    pub fn text(&mut self) -> &mut TextContext {
        &mut self.text_context
    }

    /// Registers a bitmap under a resource name.
    pub fn add_bitmap(&mut self, name: impl Into<String>, bitmap: Bitmap) {
        self.bitmaps.push((name.into(), bitmap));
    }

    /// Paints a registered bitmap into the given rectangle, in PDF
    /// coordinates (origin bottom-left).
    pub fn draw_bitmap(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        if !self.bitmaps.iter().any(|(n, _)| n == name) {
            return Err(DocError::InvalidReference(format!(
                "bitmap '{name}' not registered on this page"
            )));
        }
        self.graphics_context.draw_image(name, x, y, width, height);
        Ok(())
    }

    /// Number of bitmaps placed on this page.
    pub fn bitmap_count(&self) -> usize {
        self.bitmaps.len()
    }

    pub(crate) fn width(&self) -> f64 {
        self.width
    }

    pub(crate) fn height(&self) -> f64 {
        self.height
    }

    pub(crate) fn bitmaps(&self) -> &[(String, Bitmap)] {
        &self.bitmaps
    }

    pub(crate) fn generate_content(&self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        content.extend_from_slice(&self.graphics_context.generate_operations()?);
        content.extend_from_slice(&self.text_context.generate_operations()?);
        Ok(content)
    }
}
