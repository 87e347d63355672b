//! Export orchestration: drive rasterize -> plan -> place over a block
//! sequence, guard against concurrent exports, persist all-or-nothing.

use crate::assembler::DocumentAssembler;
use crate::document::Document;
use crate::error::DocError;
use crate::geometry::PageGeometry;
use crate::raster::{rasterize, RenderError, Renderable, DEFAULT_SCALE_FACTOR};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from a whole-document export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The block sequence was empty: nothing was selected for export.
    #[error("no render targets selected for export")]
    NoRenderTargets,

    /// Rendering a specific block failed; the whole export is abandoned.
    #[error("block {index} failed to render: {source}")]
    RenderFailure {
        index: usize,
        #[source]
        source: RenderError,
    },

    /// Writing a bitmap or header into the output document failed.
    #[error("page assembly failed: {0}")]
    Assembly(#[from] DocError),

    /// Another export is running against this exporter.
    #[error("an export is already in progress")]
    ExportInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Fixed configuration for all exports from one exporter.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Render scale applied to every block.
    pub scale_factor: f64,
    /// Geometry shared by every page of every exported document.
    pub geometry: PageGeometry,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            geometry: PageGeometry::a4(),
        }
    }
}

/// Drives whole-document exports.
///
/// One exporter runs one export at a time: re-triggering while busy is
/// rejected with [`ExportError::ExportInProgress`], never interleaved.
/// The busy flag clears on success and on every failure path.
///
/// # Example
///
/// ```rust
/// use snapdoc::{Exporter, ExportOptions, Renderable, SolidSurface};
///
/// let exporter = Exporter::new(ExportOptions::default());
/// let block = SolidSurface::gray(800, 500);
/// let blocks: Vec<&dyn Renderable> = vec![&block];
///
/// let document = exporter.export(&blocks, "Assessment Report", "Q3").unwrap();
/// assert_eq!(document.page_count(), 1);
/// ```
pub struct Exporter {
    options: ExportOptions,
    busy: AtomicBool,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            busy: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// True while an export is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Exports the block sequence into a finished document.
    pub fn export(
        &self,
        blocks: &[&dyn Renderable],
        title: &str,
        subtitle: &str,
    ) -> ExportResult<Document> {
        let _guard = self.begin()?;
        self.run(blocks, title, subtitle)
    }

    /// Exports and writes the document to `path`.
    ///
    /// The file is only created once the whole document has been
    /// serialized; a failed export leaves nothing behind.
    pub fn export_to_path(
        &self,
        blocks: &[&dyn Renderable],
        title: &str,
        subtitle: &str,
        path: impl AsRef<Path>,
    ) -> ExportResult<()> {
        let _guard = self.begin()?;
        let mut document = self.run(blocks, title, subtitle)?;

        let mut buffer = Vec::new();
        document.write(&mut buffer)?;
        std::fs::write(path.as_ref(), &buffer)?;
        info!(path = %path.as_ref().display(), bytes = buffer.len(), "export saved");
        Ok(())
    }

    /// Exports into `dir`, naming the file `<stem>.pdf`.
    pub fn export_as(
        &self,
        blocks: &[&dyn Renderable],
        title: &str,
        subtitle: &str,
        dir: impl AsRef<Path>,
        stem: &str,
    ) -> ExportResult<PathBuf> {
        let path = dir.as_ref().join(format!("{stem}.pdf"));
        self.export_to_path(blocks, title, subtitle, &path)?;
        Ok(path)
    }

    fn begin(&self) -> ExportResult<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::ExportInProgress);
        }
        Ok(BusyGuard { flag: &self.busy })
    }

    fn run(
        &self,
        blocks: &[&dyn Renderable],
        title: &str,
        subtitle: &str,
    ) -> ExportResult<Document> {
        if blocks.is_empty() {
            return Err(ExportError::NoRenderTargets);
        }
        info!(block_count = blocks.len(), "starting export");

        let mut assembler =
            DocumentAssembler::new(self.options.geometry.clone(), title, subtitle)?;

        for (index, block) in blocks.iter().enumerate() {
            let bitmap = rasterize(*block, self.options.scale_factor)
                .map_err(|source| ExportError::RenderFailure { index, source })?;

            // When this block opens a placement slot, the next block is
            // rendered once purely to measure whether it can share the
            // page; the measurement bitmap is dropped immediately and the
            // block rendered again when its own turn comes.
            let lookahead = match blocks.get(index + 1) {
                Some(next) if assembler.needs_lookahead() => {
                    let measured = rasterize(*next, self.options.scale_factor).map_err(
                        |source| ExportError::RenderFailure {
                            index: index + 1,
                            source,
                        },
                    )?;
                    Some(measured.aspect_ratio())
                }
                _ => None,
            };

            let placement = assembler.place_block(bitmap, lookahead)?;
            debug!(
                block = index,
                page = placement.page_index,
                y = placement.y,
                height = placement.height,
                "placed block"
            );
        }

        let document = assembler.finalize();
        info!(pages = document.page_count(), "export complete");
        Ok(document)
    }
}

/// Clears the busy flag when an export ends, on every path out.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
