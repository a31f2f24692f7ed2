//! wgpu rendering for signed-distance-field text.
//!
//! This crate uploads atlases built by [`sdf_text`] and draws laid-out text
//! with an SDF shader.
//!
//! # Getting Started
//!
//! ```no_run
//! use sdf_text::glam::{Mat4, Vec3};
//! use sdf_text::{FontConfig, FontRegistry, PngAtlasCache, TtfGlyphSource};
//! use sdf_text_render::wgpu;
//! use sdf_text_render::{
//!     GpuFontAtlas, GpuResources, GraphicsConfig, SdfTextPipeline, TextBatch,
//!     DEFAULT_BATCH_CAPACITY,
//! };
//!
//! # fn example(target: &wgpu::TextureView) -> Result<(), Box<dyn std::error::Error>> {
//! let resources = GpuResources::new(&GraphicsConfig::default())?;
//!
//! let mut fonts = FontRegistry::new(TtfGlyphSource::new(), PngAtlasCache::new());
//! let font = fonts.add_font(FontConfig::new("assets/DejaVuSans.ttf", 14))?;
//! let image = fonts.take_atlas_image(font).unwrap();
//! let table = fonts.font(font).unwrap();
//! let atlas = GpuFontAtlas::new(&resources, table, fonts.geometry(font).unwrap(), image)?;
//!
//! let mut pipeline = SdfTextPipeline::new(
//!     &resources,
//!     wgpu::TextureFormat::Rgba8UnormSrgb,
//!     DEFAULT_BATCH_CAPACITY,
//! );
//!
//! let projection = Mat4::orthographic_rh(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
//! let line = fonts.layout(font, "Hello", Vec3::new(20.0, 300.0, 0.0)).unwrap();
//! let mut batch = TextBatch::new(table);
//! batch.add_layout(&line, projection, [1.0, 1.0, 1.0, 1.0]);
//! pipeline.render(&resources, target, &atlas, &batch)?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod font_atlas;
mod pipeline;

pub use context::{GpuResources, GraphicsConfig};
pub use error::{RenderError, RenderResult};
pub use font_atlas::{ATLAS_TEXTURE_FORMAT, GpuFontAtlas};
pub use pipeline::{
    DEFAULT_BATCH_CAPACITY, SdfTextPipeline, TextBatch, TextDraw, TextUniforms,
    glyph_vertex_layout, uniform_stride,
};

// Re-export wgpu for convenience
pub use wgpu;
