//! Atlas construction.
//!
//! [`AtlasBuilder::build`] turns a [`FontConfig`] into a glyph table plus the
//! packed distance-field image:
//!
//! 1. Rasterize every glyph in the range. Metrics are needed even when the
//!    pixels come from the cache.
//! 2. Pack the padded glyph cells.
//! 3. On a cache hit, load the pixels and check they match the layout. On a
//!    miss, compute a distance field per glyph, blit it into its cell and
//!    store the result.
//!
//! Construction is all-or-nothing: any error aborts it and no table is
//! returned.

use std::time::Instant;

use tracing::{debug, info};

use crate::atlas_image::AtlasImage;
use crate::cache::AtlasCache;
use crate::config::{AtlasParams, FontConfig};
use crate::distance_field;
use crate::error::{AtlasResult, ConfigurationError};
use crate::glyph_source::{GlyphSource, RasterizedGlyph};
use crate::packer::{self, GlyphDimensions, PackingLayout};
use crate::table::{GlyphMetrics, GlyphTable};

/// A built font: metrics plus the atlas texture.
#[derive(Debug, Clone, PartialEq)]
pub struct FontAtlas {
    table: GlyphTable,
    image: AtlasImage,
}

impl FontAtlas {
    /// The glyph table.
    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    /// The atlas texture.
    pub fn image(&self) -> &AtlasImage {
        &self.image
    }

    /// Split into table and image.
    pub fn into_parts(self) -> (GlyphTable, AtlasImage) {
        (self.table, self.image)
    }
}

/// Builds font atlases from a glyph source, going through a cache.
#[derive(Debug)]
pub struct AtlasBuilder<S, C> {
    source: S,
    cache: C,
    params: AtlasParams,
}

impl<S: GlyphSource, C: AtlasCache> AtlasBuilder<S, C> {
    /// Create a builder with default atlas parameters.
    pub fn new(source: S, cache: C) -> Self {
        Self {
            source,
            cache,
            params: AtlasParams::default(),
        }
    }

    /// Set the atlas parameters.
    #[must_use]
    pub fn with_params(mut self, params: AtlasParams) -> Self {
        self.params = params;
        self
    }

    /// The atlas parameters.
    pub fn params(&self) -> &AtlasParams {
        &self.params
    }

    /// The glyph source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Mutable access to the cache.
    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    /// Take the builder apart.
    pub fn into_parts(self) -> (S, C) {
        (self.source, self.cache)
    }

    /// Build the atlas for `config`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError`] if the configuration is invalid, the cached
    ///   image has the wrong format, or its size does not match the layout.
    /// - [`RasterizationError`](crate::error::RasterizationError) if any glyph
    ///   in the range cannot be rasterized.
    /// - [`AtlasError::CacheIo`](crate::error::AtlasError::CacheIo) if the
    ///   cache cannot be read or written.
    pub fn build(&mut self, config: &FontConfig) -> AtlasResult<FontAtlas> {
        self.params.validate()?;
        config.validate()?;

        let started = Instant::now();
        let raster_size_px = self.params.raster_size_px();
        let glyphs = config
            .code_points()
            .map(|code_point| {
                self.source
                    .rasterize(&config.font_file, code_point, raster_size_px)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            target: "sdf_text::atlas",
            font = ?config.font_file,
            count = glyphs.len(),
            raster_size_px,
            "rasterized glyphs"
        );

        let dimensions: Vec<GlyphDimensions> = glyphs
            .iter()
            .map(|glyph| GlyphDimensions::new(glyph.width(), glyph.height()))
            .collect();
        let layout = packer::pack(self.params.padding, &dimensions);

        let from_cache = self.cache.exists(&config.font_file);
        let image = if from_cache {
            let image = self.cache.load(&config.font_file)?;
            if image.dimensions() != (layout.width, layout.height) {
                return Err(ConfigurationError::DimensionMismatch {
                    path: config.font_file.clone(),
                    expected_width: layout.width,
                    expected_height: layout.height,
                    found_width: image.width(),
                    found_height: image.height(),
                }
                .into());
            }
            image
        } else {
            let image = render_distance_fields(&glyphs, &layout, &self.params);
            self.cache.store(&config.font_file, &image)?;
            image
        };

        let table = GlyphTable {
            char_start: config.char_start,
            glyphs: glyphs
                .iter()
                .enumerate()
                .map(|(index, glyph)| GlyphMetrics {
                    width: glyph.width(),
                    height: glyph.height(),
                    horizontal_bearing: glyph.horizontal_bearing,
                    vertical_bearing: glyph.vertical_bearing,
                    horizontal_advance: glyph.horizontal_advance,
                    uv: layout.uv_rect(index).unwrap_or_default(),
                })
                .collect(),
            point_size: config.point_size,
            base_raster_size: self.params.base_raster_size,
            padding: self.params.padding,
            sdf_width: config.sdf_width,
            sdf_edge: config.sdf_edge,
            atlas_width: layout.width,
            atlas_height: layout.height,
            from_cache,
        };

        info!(
            target: "sdf_text::atlas",
            font = ?config.font_file,
            width = layout.width,
            height = layout.height,
            glyphs = layout.len(),
            from_cache,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built font atlas"
        );

        Ok(FontAtlas { table, image })
    }
}

/// Compute each glyph's padded distance field and blit it into its cell.
fn render_distance_fields(
    glyphs: &[RasterizedGlyph],
    layout: &PackingLayout,
    params: &AtlasParams,
) -> AtlasImage {
    let mut image = AtlasImage::new(layout.width, layout.height);

    for (glyph, cell) in glyphs.iter().zip(&layout.cells) {
        let mask = glyph.bitmap.to_padded_mask(params.padding);
        let field = distance_field::generate(&mask, cell.width, cell.height, params.sample_radius);
        image.blit(cell.x, cell.y, cell.width, cell.height, &field);
    }

    debug!(
        target: "sdf_text::atlas",
        width = layout.width,
        height = layout.height,
        sample_radius = params.sample_radius,
        "generated distance fields"
    );

    image
}
