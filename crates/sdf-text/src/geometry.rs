//! Renderer-facing glyph quads.
//!
//! Every glyph gets one quad of four vertices, drawn as a triangle strip.
//! After the glyphs comes one more quad covering the whole atlas, used to
//! draw the character map for debugging.
//!
//! Quads are in drawn units relative to the pen position on the baseline, y
//! up. Corner order is top-left, bottom-left, top-right, bottom-right.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::table::{GlyphMetrics, GlyphTable};

/// Texture unit the atlas is bound to.
pub const FONT_TEXTURE_SLOT: u32 = 1;

/// Vertices and indices per quad.
pub const INDICES_PER_QUAD: u32 = 4;

/// One corner of a glyph quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GlyphVertex {
    /// Position in drawn units.
    pub position: [f32; 2],
    /// Atlas texture coordinate.
    pub uv: [f32; 2],
}

impl GlyphVertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }
}

/// Vertex and index data for a whole glyph table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphGeometry {
    vertices: Vec<GlyphVertex>,
    indices: Vec<u32>,
    glyph_count: u32,
}

impl GlyphGeometry {
    /// Build quads for every glyph in `table` plus the trailing charmap quad.
    pub fn build(table: &GlyphTable) -> Self {
        let glyph_count = table.char_count();
        let quad_count = glyph_count as usize + 1;
        let mut vertices = Vec::with_capacity(quad_count * INDICES_PER_QUAD as usize);

        let scale = table.scale();
        let padding = table.padding() as f32 * scale;
        for glyph in table.glyphs() {
            vertices.extend_from_slice(&glyph_quad(glyph, scale, padding));
        }

        let (atlas_width, atlas_height) = table.atlas_dimensions();
        let (w, h) = (atlas_width as f32, atlas_height as f32);
        vertices.extend_from_slice(&[
            GlyphVertex::new(0.0, h, 0.0, 0.0),
            GlyphVertex::new(0.0, 0.0, 0.0, 1.0),
            GlyphVertex::new(w, h, 1.0, 0.0),
            GlyphVertex::new(w, 0.0, 1.0, 1.0),
        ]);

        let indices = (0..vertices.len() as u32).collect();

        Self {
            vertices,
            indices,
            glyph_count,
        }
    }

    /// All vertices.
    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    /// All indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex data as bytes, for buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes, for buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of glyph quads, excluding the charmap quad.
    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Index range of glyph `glyph_index` (position in the table, not code point).
    pub fn glyph_index_range(&self, glyph_index: u32) -> Option<Range<u32>> {
        (glyph_index < self.glyph_count).then(|| quad_range(glyph_index))
    }

    /// Index range of the full-atlas charmap quad.
    pub fn charmap_index_range(&self) -> Range<u32> {
        quad_range(self.glyph_count)
    }
}

/// Index range of quad `quad`.
pub(crate) fn quad_range(quad: u32) -> Range<u32> {
    let start = quad * INDICES_PER_QUAD;
    start..start + INDICES_PER_QUAD
}

fn glyph_quad(glyph: &GlyphMetrics, scale: f32, padding: f32) -> [GlyphVertex; 4] {
    let x = glyph.horizontal_bearing as f32 * scale;
    let y = -(glyph.height as f32 - glyph.vertical_bearing as f32) * scale;

    let left = x - padding;
    let right = x + padding + glyph.width as f32 * scale;
    let bottom = y - padding;
    let top = y + padding + glyph.height as f32 * scale;

    let uv = glyph.uv;
    [
        GlyphVertex::new(left, top, uv.min.u, uv.max.v),
        GlyphVertex::new(left, bottom, uv.min.u, uv.min.v),
        GlyphVertex::new(right, top, uv.max.u, uv.max.v),
        GlyphVertex::new(right, bottom, uv.max.u, uv.min.v),
    ]
}
