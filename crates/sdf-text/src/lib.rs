//! Signed-distance-field glyph atlases and single-line text layout.
//!
//! This crate turns a font file plus a character range into a packed 8-bit
//! distance-field texture, per-glyph metrics, and quad geometry ready for a
//! GPU. The distance-field pass is slow, so built atlases are cached (by
//! default as a PNG next to the font) and restored on later runs.
//!
//! # Getting Started
//!
//! ```no_run
//! use glam::Vec3;
//! use sdf_text::{FontConfig, FontRegistry, PngAtlasCache, TtfGlyphSource};
//!
//! # fn main() -> sdf_text::AtlasResult<()> {
//! let mut fonts = FontRegistry::new(TtfGlyphSource::new(), PngAtlasCache::new());
//! let font = fonts.add_font(FontConfig::new("assets/DejaVuSans.ttf", 14))?;
//!
//! let line = fonts.layout(font, "Hello, world", Vec3::new(10.0, 40.0, 0.0));
//! let size = fonts.measure(font, "Hello, world");
//! # Ok(())
//! # }
//! ```
//!
//! # Pieces
//!
//! - [`GlyphSource`] rasterizes code points; [`TtfGlyphSource`] does so
//!   from TrueType/OpenType outlines.
//! - [`distance_field::generate`] converts a monochrome mask to an SDF.
//! - [`packer::pack`] lays glyph cells out in a fixed-column grid.
//! - [`AtlasCache`] stores built atlases ([`PngAtlasCache`],
//!   [`MemoryAtlasCache`]).
//! - [`AtlasBuilder`] ties these together into a [`FontAtlas`].
//! - [`TextLayoutEngine`] places glyphs for a line of text.
//! - [`GlyphGeometry`] holds the vertex and index data to draw them.
//! - [`FontRegistry`] owns all of the above for a set of fonts.

pub mod atlas;
pub mod atlas_image;
pub mod cache;
pub mod config;
pub mod distance_field;
pub mod error;
pub mod geometry;
pub mod glyph_source;
pub mod layout;
pub mod packer;
pub mod registry;
pub mod table;
pub mod ttf_source;

pub use atlas::{AtlasBuilder, FontAtlas};
pub use atlas_image::AtlasImage;
pub use cache::{AtlasCache, MemoryAtlasCache, PngAtlasCache};
pub use config::{AtlasParams, FontConfig, SdfTextConfig};
pub use error::{
    AtlasError, AtlasResult, ConfigError, ConfigurationError, LayoutError, RasterizationError,
};
pub use geometry::{FONT_TEXTURE_SLOT, GlyphGeometry, GlyphVertex};
pub use glyph_source::{GlyphSource, MonoBitmap, RasterizedGlyph};
pub use layout::{GlyphPlacement, TextLayout, TextLayoutEngine};
pub use packer::{TexCoord, UvRect};
pub use registry::{FontId, FontRegistry};
pub use table::{GlyphMetrics, GlyphTable};
pub use ttf_source::TtfGlyphSource;

// Re-export glam so callers can build origins and projections.
pub use glam;
