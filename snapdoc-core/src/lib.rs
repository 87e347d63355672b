//! # snapdoc
//!
//! Rasterized-block pagination and PDF export: take an ordered sequence of
//! independently-rendered content blocks, rasterize each one, scale it to
//! the page content width, and pack the bitmaps onto fixed-geometry pages
//! to assemble a single multi-page PDF.
//!
//! ## Features
//!
//! - **Block seam**: blocks are opaque — anything implementing
//!   [`Renderable`] can be paginated, from synthetic placards to
//!   pre-rendered image files
//! - **Bounded lookahead layout**: at most two blocks per page, decided by
//!   measuring the next block before closing a page
//! - **Cover header**: page 1 carries a centered title and subtitle above
//!   the first block
//! - **All-or-nothing export**: a failed block render abandons the whole
//!   document; nothing partial is ever written
//! - **Pure Rust PDF emission**: no external PDF dependencies
//!
//! ## Quick Start
//!
//! ```rust
//! use snapdoc::{ExportOptions, Exporter, Renderable, SolidSurface};
//!
//! # fn main() -> Result<(), snapdoc::ExportError> {
//! let exporter = Exporter::new(ExportOptions::default());
//!
//! let summary = SolidSurface::gray(1000, 620);
//! let details = SolidSurface::gray(1000, 380);
//! let blocks: Vec<&dyn Renderable> = vec![&summary, &details];
//!
//! let document = exporter.export(&blocks, "Assessment Report", "Site 14 - Q3")?;
//! assert!(document.page_count() >= 1);
//! # Ok(())
//! # }
//! ```
//!
//! Exporting straight to a file, named by a caller-supplied stem:
//!
//! ```rust,no_run
//! use snapdoc::{ExportOptions, Exporter, Renderable, SolidSurface};
//!
//! # fn main() -> Result<(), snapdoc::ExportError> {
//! let exporter = Exporter::new(ExportOptions::default());
//! let block = SolidSurface::gray(1000, 620);
//! let blocks: Vec<&dyn Renderable> = vec![&block];
//!
//! let path = exporter.export_as(&blocks, "Assessment Report", "Q3", "out", "site-14")?;
//! assert_eq!(path.file_name().unwrap(), "site-14.pdf");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`raster`] - bitmaps and the [`Renderable`] block seam
//! - [`layout`] - placement planning and page-break decisions
//! - [`assembler`] - cover header and page assembly
//! - [`export`] - whole-document export orchestration
//! - [`document`] / [`page`] - the output document model
//! - [`writer`] - low-level PDF emission

pub mod assembler;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graphics;
pub mod layout;
pub mod objects;
pub mod page;
pub mod raster;
pub mod text;
pub mod writer;

pub use assembler::DocumentAssembler;
pub use document::{Document, DocumentMetadata};
pub use error::{DocError, Result};
pub use export::{ExportError, ExportOptions, ExportResult, Exporter};
pub use geometry::PageGeometry;
pub use graphics::{Color, GraphicsContext};
pub use layout::{LayoutCursor, LayoutPlanner, Placement, SlotState};
pub use page::Page;
pub use raster::{rasterize, Bitmap, RenderError, Renderable, SolidSurface, DEFAULT_SCALE_FACTOR};
pub use text::{measure_text, Font, TextContext};

#[cfg(feature = "external-images")]
pub use raster::ImageSurface;

/// Current version of snapdoc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
