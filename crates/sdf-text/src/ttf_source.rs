//! TrueType/OpenType glyph source built on `fontdue`.
//!
//! Glyphs are rasterized with anti-aliasing and then thresholded at half
//! coverage into a monochrome bitmap. The distance field provides the
//! smoothing, so the grey levels are not needed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::debug;

use crate::error::RasterizationError;
use crate::glyph_source::{GlyphSource, MonoBitmap, RasterizedGlyph, fixed_26_6_to_px};

/// Coverage at or above which a pixel counts as inside the glyph.
const COVERAGE_THRESHOLD: u8 = 128;

/// Glyph source reading font files with `fontdue`.
///
/// Each font file is read and parsed once per path and kept for the
/// lifetime of the source, so rasterizing a whole character range opens and
/// parses the file once.
#[derive(Default)]
pub struct TtfGlyphSource {
    fonts: HashMap<PathBuf, Font>,
    face_index: u32,
}

impl TtfGlyphSource {
    /// Create a source using the first face of each font file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source using a specific face of font collections.
    pub fn with_face_index(face_index: u32) -> Self {
        Self {
            fonts: HashMap::new(),
            face_index,
        }
    }

    /// Number of fonts currently parsed and held in memory.
    pub fn loaded_fonts(&self) -> usize {
        self.fonts.len()
    }

    fn font(&mut self, font_file: &Path) -> Result<&Font, RasterizationError> {
        if !self.fonts.contains_key(font_file) {
            let data = std::fs::read(font_file).map_err(|source| RasterizationError::FontNotFound {
                path: font_file.to_path_buf(),
                source,
            })?;
            let bytes = data.len();
            let settings = FontSettings {
                collection_index: self.face_index,
                ..FontSettings::default()
            };
            let font = Font::from_bytes(data, settings).map_err(|reason| {
                RasterizationError::InvalidFont {
                    path: font_file.to_path_buf(),
                    reason: reason.to_string(),
                }
            })?;
            debug!(
                target: "sdf_text::ttf_source",
                path = ?font_file,
                bytes,
                "loaded font file"
            );
            self.fonts.insert(font_file.to_path_buf(), font);
        }
        Ok(&self.fonts[font_file])
    }
}

impl std::fmt::Debug for TtfGlyphSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfGlyphSource")
            .field("loaded_fonts", &self.fonts.len())
            .field("face_index", &self.face_index)
            .finish()
    }
}

impl GlyphSource for TtfGlyphSource {
    fn rasterize(
        &mut self,
        font_file: &Path,
        code_point: u32,
        raster_size_px: f32,
    ) -> Result<RasterizedGlyph, RasterizationError> {
        let font = self.font(font_file)?;

        let not_found = || RasterizationError::GlyphNotFound {
            path: font_file.to_path_buf(),
            code_point,
        };
        let ch = char::from_u32(code_point).ok_or_else(not_found)?;
        // Index 0 is .notdef.
        let glyph_index = font.lookup_glyph_index(ch);
        if glyph_index == 0 {
            return Err(not_found());
        }

        let (metrics, coverage) = font.rasterize_indexed(glyph_index, raster_size_px);
        Ok(threshold_glyph(
            &coverage,
            metrics.width,
            metrics.height,
            (metrics.xmin, metrics.ymin),
            metrics.advance_width,
        ))
    }
}

/// Build a glyph from a top-down coverage bitmap whose bottom-left corner
/// sits at `(xmin, ymin)` relative to the pen on the baseline.
fn threshold_glyph(
    coverage: &[u8],
    width: usize,
    height: usize,
    (xmin, ymin): (i32, i32),
    advance: f32,
) -> RasterizedGlyph {
    let horizontal_advance = to_pixels(advance);
    if width == 0 || height == 0 {
        // Whitespace and other outline-less glyphs.
        return RasterizedGlyph {
            bitmap: MonoBitmap::new(0, 0),
            horizontal_bearing: 0,
            vertical_bearing: 0,
            horizontal_advance,
        };
    }

    let mask: Vec<bool> = coverage
        .iter()
        .map(|&value| value >= COVERAGE_THRESHOLD)
        .collect();

    RasterizedGlyph {
        bitmap: MonoBitmap::from_mask(width as u32, height as u32, &mask),
        horizontal_bearing: xmin,
        vertical_bearing: ymin + height as i32,
        horizontal_advance,
    }
}

/// Round a pixel metric to 26.6 fixed point, then truncate to whole pixels.
fn to_pixels(value: f32) -> i32 {
    fixed_26_6_to_px((value * 64.0).round() as i64)
}
