//! Glyph rasterization interface.
//!
//! The atlas builder never talks to a font library directly. It asks a
//! [`GlyphSource`] for one monochrome bitmap per code point, together with
//! the pixel metrics needed for layout.

use std::path::Path;

use crate::error::RasterizationError;

/// A 1-bit-per-pixel bitmap, row-major, MSB-first within each byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonoBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row.
    pub pitch: u32,
    /// Packed pixel data, `pitch * height` bytes.
    pub data: Vec<u8>,
}

impl MonoBitmap {
    /// Create an all-off bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let pitch = width.div_ceil(8);
        Self {
            width,
            height,
            pitch,
            data: vec![0; (pitch * height) as usize],
        }
    }

    /// Pack a row-major boolean mask.
    pub fn from_mask(width: u32, height: u32, mask: &[bool]) -> Self {
        debug_assert_eq!(mask.len(), (width * height) as usize);
        let mut bitmap = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if mask[(y * width + x) as usize] {
                    bitmap.set(x, y, true);
                }
            }
        }
        bitmap
    }

    /// Whether the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read a pixel. Out-of-bounds reads are off.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[(y * self.pitch + x / 8) as usize];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Write a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte = &mut self.data[(y * self.pitch + x / 8) as usize];
        let bit = 0x80 >> (x % 8);
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Unpack into a boolean mask with `padding` empty pixels on every side.
    ///
    /// The result is `(width + 2p) * (height + 2p)` entries, row-major.
    pub fn to_padded_mask(&self, padding: u32) -> Vec<bool> {
        let padded_width = self.width + 2 * padding;
        let padded_height = self.height + 2 * padding;
        let mut mask = vec![false; (padded_width * padded_height) as usize];

        for y in 0..self.height {
            let row_start = ((y + padding) * padded_width + padding) as usize;
            for x in 0..self.width {
                mask[row_start + x as usize] = self.get(x, y);
            }
        }

        mask
    }
}

/// A glyph bitmap plus layout metrics, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RasterizedGlyph {
    /// The glyph's coverage mask.
    pub bitmap: MonoBitmap,
    /// Offset from the pen position to the bitmap's left edge.
    pub horizontal_bearing: i32,
    /// Offset from the baseline to the bitmap's top edge.
    pub vertical_bearing: i32,
    /// Distance the pen moves after this glyph.
    pub horizontal_advance: i32,
}

impl RasterizedGlyph {
    /// Bitmap width in pixels.
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    /// Bitmap height in pixels.
    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}

/// Converts a font metric in 26.6 fixed point to whole pixels.
///
/// Truncates toward zero, like integer division of the fixed-point value.
pub fn fixed_26_6_to_px(value: i64) -> i32 {
    (value / 64) as i32
}

/// Something that can turn a code point into a monochrome glyph.
pub trait GlyphSource {
    /// Rasterize `code_point` from `font_file` at `raster_size_px` pixels per em.
    ///
    /// A code point the font does not cover must be reported as
    /// [`RasterizationError::GlyphNotFound`] rather than returned as an
    /// empty glyph.
    fn rasterize(
        &mut self,
        font_file: &Path,
        code_point: u32,
        raster_size_px: f32,
    ) -> Result<RasterizedGlyph, RasterizationError>;
}

impl<S: GlyphSource + ?Sized> GlyphSource for &mut S {
    fn rasterize(
        &mut self,
        font_file: &Path,
        code_point: u32,
        raster_size_px: f32,
    ) -> Result<RasterizedGlyph, RasterizationError> {
        (**self).rasterize(font_file, code_point, raster_size_px)
    }
}

impl<S: GlyphSource + ?Sized> GlyphSource for Box<S> {
    fn rasterize(
        &mut self,
        font_file: &Path,
        code_point: u32,
        raster_size_px: f32,
    ) -> Result<RasterizedGlyph, RasterizationError> {
        (**self).rasterize(font_file, code_point, raster_size_px)
    }
}
