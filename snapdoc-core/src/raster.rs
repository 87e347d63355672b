//! Block rasterization: the seam between opaque content blocks and the
//! pagination engine.
//!
//! A content block is anything that can produce pixels. The engine never
//! looks inside a block; it only consumes the [`Bitmap`] the block renders
//! to, so callers plug in their own surfaces by implementing [`Renderable`].

use crate::error::Result;
use crate::objects::{Dictionary, Object};
use thiserror::Error;

/// Default render scale for a whole document.
///
/// Rendering at 2x keeps block imagery sharp when the bitmap is scaled to
/// the page content width, at roughly 4x the pixel payload of a 1x render.
pub const DEFAULT_SCALE_FACTOR: f64 = 2.0;

/// Errors from rasterizing a single block.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render target missing: {0}")]
    TargetMissing(String),

    #[error("render target not readable: {0}")]
    Blocked(String),

    #[error("pixel source decode failed: {0}")]
    Decode(String),

    #[error("invalid raster dimensions: {0}")]
    InvalidDimensions(String),
}

/// A content block that can be rendered to pixels.
///
/// `render` must not mutate the block; the same block rendered twice with
/// the same scale factor is expected to produce a bitmap of the same
/// dimensions (the engine renders a block once to measure it during
/// lookahead and again to place it).
pub trait Renderable {
    fn render(&self, scale_factor: f64) -> std::result::Result<Bitmap, RenderError>;
}

/// Rasterizes one block at the document's fixed scale factor.
pub fn rasterize(
    block: &dyn Renderable,
    scale_factor: f64,
) -> std::result::Result<Bitmap, RenderError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(RenderError::InvalidDimensions(format!(
            "scale factor must be positive, got {scale_factor}"
        )));
    }
    block.render(scale_factor)
}

/// An 8-bit RGB bitmap produced by rasterizing one block.
///
/// Immutable once produced. The pagination engine only reads the pixel
/// dimensions; the pixel data is carried through unchanged into the output
/// document.
#[derive(Debug, Clone)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wraps raw RGB8 pixel data (3 bytes per pixel, row-major).
    pub fn from_rgb8(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> std::result::Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "bitmap must have positive dimensions, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(RenderError::InvalidDimensions(format!(
                "expected {expected} bytes of RGB8 data for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height over width. Placement scales a bitmap to the page content
    /// width, so its placed height is `content_width * aspect_ratio()`.
    pub fn aspect_ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    /// Pixel data, row-major RGB8.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Builds the image XObject embedding this bitmap.
    pub(crate) fn to_xobject(&self) -> Result<Object> {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name("XObject".to_string()));
        dict.set("Subtype", Object::Name("Image".to_string()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set("ColorSpace", Object::Name("DeviceRGB".to_string()));
        dict.set("BitsPerComponent", Object::Integer(8));

        #[cfg(feature = "compression")]
        {
            use flate2::write::ZlibEncoder;
            use flate2::Compression;
            use std::io::Write;

            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(&self.data)
                .and_then(|_| encoder.finish())
                .map(|compressed| {
                    dict.set("Filter", Object::Name("FlateDecode".to_string()));
                    Object::Stream(dict, compressed)
                })
                .map_err(|e| crate::error::DocError::CompressionError(e.to_string()))
        }

        #[cfg(not(feature = "compression"))]
        {
            Ok(Object::Stream(dict, self.data.clone()))
        }
    }
}

/// A synthetic block filled with a single color.
///
/// Useful for demos and tests that need blocks of a known size without a
/// rendering environment. The natural size is given in pixels at 1x and
/// scales with the document's scale factor.
#[derive(Debug, Clone)]
pub struct SolidSurface {
    width: u32,
    height: u32,
    rgb: [u8; 3],
}

impl SolidSurface {
    pub fn new(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self { width, height, rgb }
    }

    /// A light gray placard, the common case in demos.
    pub fn gray(width: u32, height: u32) -> Self {
        Self::new(width, height, [0xE4, 0xE4, 0xE4])
    }
}

impl Renderable for SolidSurface {
    fn render(&self, scale_factor: f64) -> std::result::Result<Bitmap, RenderError> {
        let width = (self.width as f64 * scale_factor).round() as u32;
        let height = (self.height as f64 * scale_factor).round() as u32;
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "{}x{} at scale {scale_factor} collapses to zero pixels",
                self.width, self.height
            )));
        }
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&self.rgb);
        }
        Bitmap::from_rgb8(width, height, data)
    }
}

/// A pre-rendered block backed by a PNG or JPEG file.
///
/// The file is the finished render of the block, so the scale factor does
/// not apply: resampling an already-rasterized surface would change the
/// pixel data without adding sharpness.
#[cfg(feature = "external-images")]
#[derive(Debug, Clone)]
pub struct ImageSurface {
    path: std::path::PathBuf,
}

#[cfg(feature = "external-images")]
impl ImageSurface {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "external-images")]
impl Renderable for ImageSurface {
    fn render(&self, _scale_factor: f64) -> std::result::Result<Bitmap, RenderError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                RenderError::TargetMissing(self.path.display().to_string())
            }
            std::io::ErrorKind::PermissionDenied => {
                RenderError::Blocked(self.path.display().to_string())
            }
            _ => RenderError::Decode(format!("{}: {e}", self.path.display())),
        })?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| RenderError::Decode(format!("{}: {e}", self.path.display())))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        Bitmap::from_rgb8(width, height, rgb.into_raw())
    }
}
