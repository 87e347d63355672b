//! Page layout planning: where each rendered block lands.
//!
//! Blocks are scaled uniformly to the page content width and stacked top
//! to bottom. A page accepts at most two blocks: after placing the first,
//! the planner measures the next block once, and only extends the page
//! when that block fits above the bottom margin. After a second placement
//! the page closes regardless of remaining room. The cap is a deliberate
//! bound — packing more would mean re-measuring arbitrarily many
//! candidates per page — and layouts depend on it staying exact.

use crate::geometry::PageGeometry;

/// What the cursor expects next on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// The next block opens a page (or is the very first of the document).
    ExpectingFirst,
    /// The lookahead approved the next block for the current page.
    ExpectingSecond,
}

/// Mutable per-document layout state.
///
/// Exactly one cursor exists per document under construction; it is owned
/// by the assembler for the lifetime of one export and mutated only
/// through [`LayoutPlanner::place`].
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    /// Page currently open for placement (0-based).
    pub page_index: usize,
    /// Top edge for the next placement, measured from the page top.
    pub y: f64,
    /// Lookahead state for the current page.
    pub state: SlotState,
    /// Blocks placed so far in this document.
    pub placed: usize,
}

impl LayoutCursor {
    /// Cursor for a fresh document: page 1 open, first placement below
    /// the cover header band.
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            page_index: 0,
            y: geometry.header_reservation,
            state: SlotState::ExpectingFirst,
            placed: 0,
        }
    }
}

/// A committed placement decision, in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Page the block lands on (0-based).
    pub page_index: usize,
    /// Left edge.
    pub x: f64,
    /// Top edge, measured from the page top.
    pub y: f64,
    /// Placed width, always the page content width.
    pub width: f64,
    /// Placed height, `width * aspect`.
    pub height: f64,
    /// True when this placement opened a new page.
    pub opened_page: bool,
}

/// Decides placement and page breaks for a sequence of block bitmaps.
#[derive(Debug, Clone)]
pub struct LayoutPlanner {
    geometry: PageGeometry,
}

impl LayoutPlanner {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Height of a block scaled to the content width.
    pub fn placed_height(&self, aspect: f64) -> f64 {
        self.geometry.content_width() * aspect
    }

    /// Places one block and advances the cursor.
    ///
    /// `aspect` is the bitmap's height/width ratio. `lookahead` carries the
    /// aspect ratio of the block after this one, measured by the caller;
    /// it is only consulted when this block is the first on its page, and
    /// decides whether the next block shares the page or opens a new one.
    pub fn place(
        &self,
        cursor: &mut LayoutCursor,
        aspect: f64,
        lookahead: Option<f64>,
    ) -> Placement {
        let width = self.geometry.content_width();
        let height = self.placed_height(aspect);

        let placement = match cursor.state {
            SlotState::ExpectingFirst => {
                let opened_page = cursor.placed > 0;
                if opened_page {
                    cursor.page_index += 1;
                    cursor.y = self.geometry.margin;
                }

                let placement = Placement {
                    page_index: cursor.page_index,
                    x: self.geometry.margin,
                    y: cursor.y,
                    width,
                    height,
                    opened_page,
                };

                // Advance past this block, clamped so an oversized block
                // cannot push the cursor out of the open band.
                cursor.y = (cursor.y + height + self.geometry.inter_block_spacing)
                    .min(self.geometry.content_bottom());

                if let Some(next_aspect) = lookahead {
                    let next_height = self.placed_height(next_aspect);
                    if cursor.y + next_height <= self.geometry.content_bottom() {
                        cursor.state = SlotState::ExpectingSecond;
                    }
                }

                placement
            }
            SlotState::ExpectingSecond => {
                let placement = Placement {
                    page_index: cursor.page_index,
                    x: self.geometry.margin,
                    y: cursor.y,
                    width,
                    height,
                    opened_page: false,
                };

                // Two blocks close the page no matter how much room is left.
                cursor.state = SlotState::ExpectingFirst;

                placement
            }
        };

        cursor.placed += 1;
        debug_assert!(
            cursor.y >= self.geometry.margin && cursor.y <= self.geometry.content_bottom(),
            "cursor y {} outside [{}, {}]",
            cursor.y,
            self.geometry.margin,
            self.geometry.content_bottom(),
        );

        placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_geometry() -> PageGeometry {
        // Content width 400 so a WxH block with W=400 places at its pixel
        // height, which keeps expected values readable.
        PageGeometry {
            page_width: 460.0,
            page_height: 800.0,
            margin: 30.0,
            header_reservation: 60.0,
            inter_block_spacing: 30.0,
        }
    }

    fn aspect(height: f64) -> f64 {
        height / 400.0
    }

    #[test]
    fn test_first_block_starts_below_header() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        let p = planner.place(&mut cursor, aspect(400.0), None);
        assert_eq!(p.page_index, 0);
        assert_eq!(p.x, 30.0);
        assert_eq!(p.y, 60.0);
        assert_eq!(p.width, 400.0);
        assert_eq!(p.height, 400.0);
        assert!(!p.opened_page);
    }

    #[test]
    fn test_placed_width_is_content_width() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        for a in [0.1, 0.5, 1.3] {
            let p = planner.place(&mut cursor, a, None);
            assert_eq!(p.width, 400.0);
            assert!((p.height - 400.0 * a).abs() < 1e-9);
            // Aspect ratio preserved through placement.
            assert!((p.height / p.width - a).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lookahead_fit_shares_page() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // 60 + 400 + 30 = 490; 490 + 200 = 690 <= 770, so B joins page 1.
        planner.place(&mut cursor, aspect(400.0), Some(aspect(200.0)));
        assert_eq!(cursor.state, SlotState::ExpectingSecond);

        let b = planner.place(&mut cursor, aspect(200.0), None);
        assert_eq!(b.page_index, 0);
        assert_eq!(b.y, 490.0);
        assert!(!b.opened_page);
    }

    #[test]
    fn test_lookahead_miss_breaks_page() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // 490 + 300 = 790 > 770: the next block must open page 2.
        planner.place(&mut cursor, aspect(400.0), Some(aspect(300.0)));
        assert_eq!(cursor.state, SlotState::ExpectingFirst);

        let b = planner.place(&mut cursor, aspect(300.0), None);
        assert_eq!(b.page_index, 1);
        assert_eq!(b.y, 30.0);
        assert!(b.opened_page);
    }

    #[test]
    fn test_fit_boundary_is_inclusive() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // 490 + 280 = 770 == content bottom: exactly-fitting blocks share.
        planner.place(&mut cursor, aspect(400.0), Some(aspect(280.0)));
        assert_eq!(cursor.state, SlotState::ExpectingSecond);
    }

    #[test]
    fn test_page_closes_after_second_block() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // Two tiny blocks leave plenty of room, but the page still closes:
        // a third tiny block opens page 2.
        planner.place(&mut cursor, aspect(50.0), Some(aspect(50.0)));
        planner.place(&mut cursor, aspect(50.0), None);
        assert_eq!(cursor.state, SlotState::ExpectingFirst);

        let c = planner.place(&mut cursor, aspect(50.0), Some(aspect(50.0)));
        assert_eq!(c.page_index, 1);
        assert_eq!(c.y, 30.0);
        assert!(c.opened_page);
    }

    #[test]
    fn test_three_block_sequence() {
        // A 400pt, B 200pt, C 500pt on an 800pt page: A and B share
        // page 1 (60+400+30+200 = 690 <= 770), C lands alone on page 2.
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        let a = planner.place(&mut cursor, aspect(400.0), Some(aspect(200.0)));
        assert_eq!((a.page_index, a.y), (0, 60.0));

        let b = planner.place(&mut cursor, aspect(200.0), None);
        assert_eq!((b.page_index, b.y), (0, 490.0));

        let c = planner.place(&mut cursor, aspect(500.0), None);
        assert_eq!((c.page_index, c.y), (1, 30.0));
        assert!(c.opened_page);
    }

    #[test]
    fn test_second_placement_fits_check_held() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());
        let g = test_geometry();

        let first = planner.place(&mut cursor, aspect(400.0), Some(aspect(200.0)));
        let second = planner.place(&mut cursor, aspect(200.0), None);

        // The fits check that admitted the second block.
        assert!(
            g.header_reservation
                + first.height
                + g.inter_block_spacing
                + second.height
                <= g.page_height - g.margin
        );
        assert_eq!(second.y, first.y + first.height + g.inter_block_spacing);
    }

    #[test]
    fn test_oversized_block_clamps_cursor() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // Taller than the whole page; cursor stays inside the open band
        // and the next block opens a fresh page.
        planner.place(&mut cursor, aspect(900.0), Some(aspect(50.0)));
        assert!(cursor.y <= 770.0);
        assert_eq!(cursor.state, SlotState::ExpectingFirst);

        let next = planner.place(&mut cursor, aspect(50.0), None);
        assert_eq!(next.page_index, 1);
    }

    #[test]
    fn test_no_lookahead_keeps_page_open_state() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        // Without a next block there is nothing to approve; the state
        // stays ExpectingFirst so a later block would open a page.
        planner.place(&mut cursor, aspect(100.0), None);
        assert_eq!(cursor.state, SlotState::ExpectingFirst);
    }

    #[test]
    fn test_pages_after_first_start_at_margin() {
        let planner = LayoutPlanner::new(test_geometry());
        let mut cursor = LayoutCursor::new(planner.geometry());

        let mut first_tops = vec![];
        for _ in 0..4 {
            // Aspect chosen so no two blocks ever share a page.
            let p = planner.place(&mut cursor, aspect(600.0), Some(aspect(600.0)));
            if p.opened_page || p.page_index == 0 {
                first_tops.push((p.page_index, p.y));
            }
        }

        assert_eq!(
            first_tops,
            vec![(0, 60.0), (1, 30.0), (2, 30.0), (3, 30.0)]
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Pages hold one or two blocks, never more; every placement
            /// spans the content width; first placements start at the
            /// header reservation (page 1) or the margin (later pages).
            #[test]
            fn placement_invariants(
                aspects in prop::collection::vec(0.05f64..1.8, 1..40),
                page_height in 400.0f64..1200.0,
                margin in 10.0f64..60.0,
                spacing in 0.0f64..40.0,
            ) {
                let geometry = PageGeometry {
                    page_width: 500.0,
                    page_height,
                    margin,
                    header_reservation: margin + 30.0,
                    inter_block_spacing: spacing,
                };
                prop_assume!(geometry.validate().is_ok());

                let planner = LayoutPlanner::new(geometry.clone());
                let mut cursor = LayoutCursor::new(&geometry);
                let mut per_page = std::collections::BTreeMap::new();

                let mut placements = Vec::new();
                for (i, &aspect) in aspects.iter().enumerate() {
                    let lookahead = if cursor.state == SlotState::ExpectingFirst {
                        aspects.get(i + 1).copied()
                    } else {
                        None
                    };
                    let p = planner.place(&mut cursor, aspect, lookahead);
                    *per_page.entry(p.page_index).or_insert(0usize) += 1;
                    placements.push(p);
                }

                for (&page, &count) in &per_page {
                    prop_assert!(count >= 1 && count <= 2, "page {} holds {}", page, count);
                }

                for p in &placements {
                    prop_assert!((p.width - geometry.content_width()).abs() < 1e-9);
                    prop_assert!(p.x == geometry.margin);
                    prop_assert!(p.y >= geometry.margin);
                }

                let mut seen = std::collections::BTreeSet::new();
                for p in &placements {
                    if seen.insert(p.page_index) {
                        let expected = if p.page_index == 0 {
                            geometry.header_reservation
                        } else {
                            geometry.margin
                        };
                        prop_assert!((p.y - expected).abs() < 1e-9);
                    }
                }
            }

            /// Identical inputs plan identical layouts.
            #[test]
            fn planning_is_deterministic(
                aspects in prop::collection::vec(0.05f64..1.8, 1..20),
            ) {
                let geometry = PageGeometry::a4();
                let planner = LayoutPlanner::new(geometry.clone());

                let run = || {
                    let mut cursor = LayoutCursor::new(&geometry);
                    aspects
                        .iter()
                        .enumerate()
                        .map(|(i, &aspect)| {
                            let lookahead = if cursor.state == SlotState::ExpectingFirst {
                                aspects.get(i + 1).copied()
                            } else {
                                None
                            };
                            planner.place(&mut cursor, aspect, lookahead)
                        })
                        .collect::<Vec<_>>()
                };

                prop_assert_eq!(run(), run());
            }
        }
    }
}
