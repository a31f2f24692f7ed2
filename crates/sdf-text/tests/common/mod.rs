//! Shared fixtures for integration tests.

use std::path::Path;

use sdf_text::{MonoBitmap, RasterizationError, RasterizedGlyph};

/// Glyph source producing filled rectangles whose size depends on the code
/// point. Code points in `missing` are reported as absent from the font.
#[derive(Debug, Default)]
pub struct RectSource {
    pub missing: Vec<u32>,
}

impl RectSource {
    pub fn advance(code_point: u32) -> i32 {
        Self::size(code_point).0 as i32 + 3
    }

    pub fn size(code_point: u32) -> (u32, u32) {
        (4 + code_point % 7, 6 + code_point % 5)
    }
}

impl sdf_text::GlyphSource for RectSource {
    fn rasterize(
        &mut self,
        font_file: &Path,
        code_point: u32,
        _raster_size_px: f32,
    ) -> Result<RasterizedGlyph, RasterizationError> {
        if self.missing.contains(&code_point) {
            return Err(RasterizationError::GlyphNotFound {
                path: font_file.to_path_buf(),
                code_point,
            });
        }

        let (width, height) = Self::size(code_point);
        let mask = vec![true; (width * height) as usize];
        Ok(RasterizedGlyph {
            bitmap: MonoBitmap::from_mask(width, height, &mask),
            horizontal_bearing: 1,
            vertical_bearing: height as i32 - 1,
            horizontal_advance: Self::advance(code_point),
        })
    }
}

/// Small atlas parameters so tests stay fast.
pub fn test_params() -> sdf_text::AtlasParams {
    sdf_text::AtlasParams::default()
        .with_padding(3)
        .with_sample_radius(3)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
