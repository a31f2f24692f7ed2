//! Per-font glyph metrics.

use crate::error::LayoutError;
use crate::packer::UvRect;

/// Metrics and atlas location of one glyph, in base-raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    /// Unpadded bitmap width.
    pub width: u32,
    /// Unpadded bitmap height.
    pub height: u32,
    /// Pen position to bitmap left edge.
    pub horizontal_bearing: i32,
    /// Baseline to bitmap top edge.
    pub vertical_bearing: i32,
    /// Pen advance.
    pub horizontal_advance: i32,
    /// Padded cell in the atlas texture.
    pub uv: UvRect,
}

/// Immutable glyph table for one registered font.
///
/// Glyph `i` describes code point `char_start + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTable {
    pub(crate) char_start: u32,
    pub(crate) glyphs: Vec<GlyphMetrics>,
    pub(crate) point_size: u32,
    pub(crate) base_raster_size: u32,
    pub(crate) padding: u32,
    pub(crate) sdf_width: f32,
    pub(crate) sdf_edge: f32,
    pub(crate) atlas_width: u32,
    pub(crate) atlas_height: u32,
    pub(crate) from_cache: bool,
}

impl GlyphTable {
    /// First code point covered.
    pub fn char_start(&self) -> u32 {
        self.char_start
    }

    /// Number of glyphs.
    pub fn char_count(&self) -> u32 {
        self.glyphs.len() as u32
    }

    /// One past the last code point covered.
    pub fn char_end(&self) -> u32 {
        self.char_start + self.char_count()
    }

    /// Whether `code_point` has a glyph in this table.
    pub fn contains(&self, code_point: u32) -> bool {
        (self.char_start..self.char_end()).contains(&code_point)
    }

    /// Index of `code_point` in [`glyphs`](Self::glyphs).
    pub fn index_of(&self, code_point: u32) -> Result<usize, LayoutError> {
        if self.contains(code_point) {
            Ok((code_point - self.char_start) as usize)
        } else {
            Err(LayoutError::OutOfRange {
                code_point,
                start: self.char_start,
                end: self.char_end(),
            })
        }
    }

    /// Metrics for `code_point`.
    pub fn get(&self, code_point: u32) -> Result<&GlyphMetrics, LayoutError> {
        self.index_of(code_point).map(|index| &self.glyphs[index])
    }

    /// All glyphs in code-point order.
    pub fn glyphs(&self) -> &[GlyphMetrics] {
        &self.glyphs
    }

    /// Point size text is drawn at.
    pub fn point_size(&self) -> u32 {
        self.point_size
    }

    /// Point size the atlas was rasterized at.
    pub fn base_raster_size(&self) -> u32 {
        self.base_raster_size
    }

    /// Multiplier from atlas pixels to drawn units.
    pub fn scale(&self) -> f32 {
        self.point_size as f32 / self.base_raster_size as f32
    }

    /// Cell padding in atlas pixels.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// SDF shading width.
    pub fn sdf_width(&self) -> f32 {
        self.sdf_width
    }

    /// SDF shading edge.
    pub fn sdf_edge(&self) -> f32 {
        self.sdf_edge
    }

    /// Atlas texture size in pixels.
    pub fn atlas_dimensions(&self) -> (u32, u32) {
        (self.atlas_width, self.atlas_height)
    }

    /// Whether the atlas pixels were restored from the cache.
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }
}
