//! Fixed page geometry for a whole document.

use crate::error::{DocError, Result};

/// Page dimensions and layout reservations in points (1/72 inch).
///
/// A geometry is supplied once at the start of an export and shared
/// read-only across all blocks of the document.
///
/// # Example
///
/// ```rust
/// use snapdoc::PageGeometry;
///
/// let geometry = PageGeometry::a4();
/// assert!(geometry.content_width() < geometry.page_width);
/// geometry.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub page_width: f64,
    /// Page height
    pub page_height: f64,
    /// Uniform margin on all four sides
    pub margin: f64,
    /// Vertical space reserved at the top of page 1 for the cover header
    pub header_reservation: f64,
    /// Vertical gap between two blocks sharing a page
    pub inter_block_spacing: f64,
}

impl PageGeometry {
    /// A4 geometry (595 x 842 points) with the default reservations.
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// US Letter geometry (612 x 792 points) with the default reservations.
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Geometry for an arbitrary page size with the default reservations.
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            margin: 36.0,
            header_reservation: 90.0,
            inter_block_spacing: 18.0,
        }
    }

    /// Horizontal space available to a placed block.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest allowed bottom edge of a placement, measured from the page top.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    /// Checks that the geometry can hold at least one placement.
    pub fn validate(&self) -> Result<()> {
        if !self.page_width.is_finite() || self.page_width <= 0.0 {
            return Err(DocError::InvalidGeometry(format!(
                "page width must be positive, got {}",
                self.page_width
            )));
        }
        if !self.page_height.is_finite() || self.page_height <= 0.0 {
            return Err(DocError::InvalidGeometry(format!(
                "page height must be positive, got {}",
                self.page_height
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(DocError::InvalidGeometry(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(DocError::InvalidGeometry(format!(
                "margins leave no content width on a {} pt wide page",
                self.page_width
            )));
        }
        if !self.inter_block_spacing.is_finite() || self.inter_block_spacing < 0.0 {
            return Err(DocError::InvalidGeometry(format!(
                "inter-block spacing must be non-negative, got {}",
                self.inter_block_spacing
            )));
        }
        // The first placement on page 1 starts at the header reservation,
        // so it must lie inside the vertical band open to placements.
        if self.header_reservation < self.margin || self.header_reservation >= self.content_bottom()
        {
            return Err(DocError::InvalidGeometry(format!(
                "header reservation {} outside [{}, {})",
                self.header_reservation,
                self.margin,
                self.content_bottom()
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
