//! Document assembly: cover header, page opening, bitmap placement.

use crate::document::Document;
use crate::error::Result;
use crate::geometry::PageGeometry;
use crate::layout::{LayoutCursor, LayoutPlanner, Placement, SlotState};
use crate::page::Page;
use crate::raster::Bitmap;
use crate::text::{measure_text, Font};

const COVER_TITLE_SIZE: f64 = 18.0;
const COVER_SUBTITLE_SIZE: f64 = 11.0;
const COVER_RULE_INSET: f64 = 10.0;

/// Builds one document from a sequence of block bitmaps.
///
/// The assembler owns the page geometry and the layout cursor for the
/// lifetime of one export. Page 1 is opened at construction time and the
/// cover header painted before any block lands; later pages open only
/// when the planner decides a block needs one, so an opened page always
/// carries at least one block and never inherits state from its
/// predecessor.
pub struct DocumentAssembler {
    planner: LayoutPlanner,
    cursor: LayoutCursor,
    document: Document,
    pages: Vec<Page>,
    placements: Vec<Placement>,
}

impl DocumentAssembler {
    /// Validates the geometry, opens page 1 and paints the cover header.
    pub fn new(geometry: PageGeometry, title: &str, subtitle: &str) -> Result<Self> {
        geometry.validate()?;

        let mut document = Document::new();
        document.set_title(title);
        if !subtitle.is_empty() {
            document.set_subject(subtitle);
        }

        let mut first_page = Page::new(geometry.page_width, geometry.page_height);
        draw_cover(&mut first_page, &geometry, title, subtitle)?;

        let cursor = LayoutCursor::new(&geometry);
        Ok(Self {
            planner: LayoutPlanner::new(geometry),
            cursor,
            document,
            pages: vec![first_page],
            placements: Vec::new(),
        })
    }

    /// True when the next block will be the first on its page, which is
    /// when a lookahead measurement of the block after it is worth taking.
    pub fn needs_lookahead(&self) -> bool {
        self.cursor.state == SlotState::ExpectingFirst
    }

    /// Scaled height the given aspect ratio would occupy on a page.
    pub fn placed_height(&self, aspect: f64) -> f64 {
        self.planner.placed_height(aspect)
    }

    /// Places one block bitmap, opening a new page when the planner says so.
    ///
    /// `lookahead` is the aspect ratio of the block after this one, if it
    /// exists and this block opens a placement slot; it decides whether
    /// that next block may share the page.
    pub fn place_block(&mut self, bitmap: Bitmap, lookahead: Option<f64>) -> Result<Placement> {
        let placement = self
            .planner
            .place(&mut self.cursor, bitmap.aspect_ratio(), lookahead);

        if placement.opened_page {
            let geometry = self.planner.geometry();
            self.pages
                .push(Page::new(geometry.page_width, geometry.page_height));
        }

        let name = format!("Blk{}", self.placements.len() + 1);
        let page_height = self.planner.geometry().page_height;
        let page = self
            .pages
            .last_mut()
            .expect("page 1 is opened at construction");

        // Placements are planned top-down; PDF device space grows upward.
        let pdf_y = page_height - placement.y - placement.height;
        page.add_bitmap(name.clone(), bitmap);
        page.draw_bitmap(&name, placement.x, pdf_y, placement.width, placement.height)?;

        self.placements.push(placement);
        Ok(placement)
    }

    /// Placements committed so far, in block order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Yields the completed document.
    pub fn finalize(mut self) -> Document {
        for page in self.pages {
            self.document.add_page(page);
        }
        self.document
    }
}

/// Paints title, subtitle and a hairline rule into the header band.
fn draw_cover(page: &mut Page, geometry: &PageGeometry, title: &str, subtitle: &str) -> Result<()> {
    let title_baseline = geometry.page_height - geometry.margin - COVER_TITLE_SIZE;
    let title_x = centered_x(geometry, title, Font::HelveticaBold, COVER_TITLE_SIZE);
    page.text()
        .set_font(Font::HelveticaBold, COVER_TITLE_SIZE)
        .at(title_x, title_baseline)
        .write(title)?;

    if !subtitle.is_empty() {
        let subtitle_baseline = title_baseline - COVER_SUBTITLE_SIZE * 1.6;
        let subtitle_x = centered_x(geometry, subtitle, Font::Helvetica, COVER_SUBTITLE_SIZE);
        page.text()
            .set_font(Font::Helvetica, COVER_SUBTITLE_SIZE)
            .at(subtitle_x, subtitle_baseline)
            .write(subtitle)?;
    }

    let rule_y = geometry.page_height - geometry.header_reservation + COVER_RULE_INSET;
    page.graphics()
        .set_stroke_color(crate::graphics::Color::gray(0.6))
        .set_line_width(0.5)
        .move_to(geometry.margin, rule_y)
        .line_to(geometry.page_width - geometry.margin, rule_y)
        .stroke();

    Ok(())
}

fn centered_x(geometry: &PageGeometry, text: &str, font: Font, size: f64) -> f64 {
    let width = measure_text(text, font, size);
    ((geometry.page_width - width) / 2.0).max(geometry.margin)
}
