//! Registered fonts.
//!
//! [`FontRegistry`] owns the glyph source and atlas cache used to build
//! atlases, and keeps the resulting glyph tables for the lifetime of the
//! registry. Each font is identified by the [`FontId`] returned when it was
//! added.
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use sdf_text::{FontConfig, FontRegistry, PngAtlasCache, TtfGlyphSource};
//!
//! let mut fonts = FontRegistry::new(TtfGlyphSource::new(), PngAtlasCache::new());
//! let body = fonts.add_font(FontConfig::new("assets/DejaVuSans.ttf", 14))?;
//!
//! // Upload the atlas once.
//! let image = fonts.take_atlas_image(body).unwrap();
//!
//! let line = fonts.layout(body, "Hello", Vec3::new(10.0, 20.0, 0.0)).unwrap();
//! ```

use glam::{Vec2, Vec3};
use tracing::info;

use crate::atlas::AtlasBuilder;
use crate::atlas_image::AtlasImage;
use crate::cache::AtlasCache;
use crate::config::{AtlasParams, FontConfig, SdfTextConfig};
use crate::error::AtlasResult;
use crate::geometry::GlyphGeometry;
use crate::glyph_source::GlyphSource;
use crate::layout::{TextLayout, TextLayoutEngine};
use crate::table::GlyphTable;

/// Identifies a font within one [`FontRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(usize);

impl FontId {
    /// Registration order, starting at zero.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct RegisteredFont {
    config: FontConfig,
    table: GlyphTable,
    geometry: GlyphGeometry,
    image: Option<AtlasImage>,
}

/// Builds and owns font atlases.
#[derive(Debug)]
pub struct FontRegistry<S, C> {
    builder: AtlasBuilder<S, C>,
    fonts: Vec<RegisteredFont>,
}

impl<S: GlyphSource, C: AtlasCache> FontRegistry<S, C> {
    /// Create an empty registry with default atlas parameters.
    pub fn new(source: S, cache: C) -> Self {
        Self {
            builder: AtlasBuilder::new(source, cache),
            fonts: Vec::new(),
        }
    }

    /// Set the atlas parameters used for subsequent registrations.
    #[must_use]
    pub fn with_params(mut self, params: AtlasParams) -> Self {
        self.builder = self.builder.with_params(params);
        self
    }

    /// Create a registry and register every font in `config`.
    ///
    /// Stops at the first font that fails to build.
    pub fn from_config(
        source: S,
        cache: C,
        config: &SdfTextConfig,
    ) -> AtlasResult<(Self, Vec<FontId>)> {
        let mut registry = Self::new(source, cache).with_params(config.atlas);
        let ids = config
            .fonts
            .iter()
            .map(|font| registry.add_font(font.clone()))
            .collect::<AtlasResult<Vec<_>>>()?;
        Ok((registry, ids))
    }

    /// Build the atlas for `config` and register it.
    ///
    /// On error nothing is registered.
    pub fn add_font(&mut self, config: FontConfig) -> AtlasResult<FontId> {
        let (table, image) = self.builder.build(&config)?.into_parts();
        let geometry = GlyphGeometry::build(&table);
        let id = FontId(self.fonts.len());

        info!(
            target: "sdf_text::registry",
            id = id.0,
            font = ?config.font_file,
            point_size = config.point_size,
            from_cache = table.from_cache(),
            "registered font"
        );

        self.fonts.push(RegisteredFont {
            config,
            table,
            geometry,
            image: Some(image),
        });
        Ok(id)
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Ids of all registered fonts, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = FontId> + '_ {
        (0..self.fonts.len()).map(FontId)
    }

    /// Glyph table of a registered font.
    pub fn font(&self, id: FontId) -> Option<&GlyphTable> {
        self.get(id).map(|font| &font.table)
    }

    /// Configuration a font was registered with.
    pub fn config(&self, id: FontId) -> Option<&FontConfig> {
        self.get(id).map(|font| &font.config)
    }

    /// Quad geometry of a registered font.
    pub fn geometry(&self, id: FontId) -> Option<&GlyphGeometry> {
        self.get(id).map(|font| &font.geometry)
    }

    /// Hand over the atlas image for upload.
    ///
    /// Returns the image the first time and `None` afterwards.
    pub fn take_atlas_image(&mut self, id: FontId) -> Option<AtlasImage> {
        self.fonts.get_mut(id.0)?.image.take()
    }

    /// Layout engine for a registered font.
    pub fn engine(&self, id: FontId) -> Option<TextLayoutEngine<'_>> {
        self.font(id).map(TextLayoutEngine::new)
    }

    /// Lay out `text` with a registered font.
    pub fn layout(&self, id: FontId, text: &str, origin: Vec3) -> Option<TextLayout> {
        self.engine(id).map(|engine| engine.layout(text, origin))
    }

    /// Lay out raw UTF-8 with a registered font.
    pub fn layout_bytes(&self, id: FontId, bytes: &[u8], origin: Vec3) -> Option<TextLayout> {
        self.engine(id).map(|engine| engine.layout_bytes(bytes, origin))
    }

    /// Measure `text` with a registered font.
    pub fn measure(&self, id: FontId, text: &str) -> Option<Vec2> {
        self.engine(id).map(|engine| engine.measure(text))
    }

    /// Measure raw UTF-8 with a registered font.
    pub fn measure_bytes(&self, id: FontId, bytes: &[u8]) -> Option<Vec2> {
        self.engine(id).map(|engine| engine.measure_bytes(bytes))
    }

    /// The atlas builder, with its source and cache.
    pub fn builder(&self) -> &AtlasBuilder<S, C> {
        &self.builder
    }

    fn get(&self, id: FontId) -> Option<&RegisteredFont> {
        self.fonts.get(id.0)
    }
}
