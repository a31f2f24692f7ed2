//! Single-line text layout.
//!
//! Layout walks the text one code point at a time, placing each glyph at the
//! current pen position and advancing the pen by the glyph's scaled advance.
//! There is no shaping, kerning or line breaking.
//!
//! Problems with individual glyphs (code points outside the atlas range,
//! malformed UTF-8) never abort a line. The glyph is skipped, the problem is
//! logged and returned in [`TextLayout::diagnostics`], and layout continues.

use std::ops::Range;

use glam::{Mat4, Vec2, Vec3};
use tracing::warn;

use crate::error::LayoutError;
use crate::geometry::quad_range;
use crate::table::GlyphTable;

/// Depth added per code point so later glyphs draw on top of earlier ones.
pub const DEPTH_STEP: f32 = 1e-6;

/// One positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    /// Position of the glyph in the table.
    pub glyph_index: u32,
    /// The code point drawn.
    pub code_point: u32,
    /// Pen position: baseline x/y plus a small depth offset.
    pub translation: Vec3,
}

impl GlyphPlacement {
    /// Index range of this glyph's quad in [`GlyphGeometry`](crate::GlyphGeometry).
    pub fn index_range(&self) -> Range<u32> {
        quad_range(self.glyph_index)
    }

    /// Model-view-projection matrix for this glyph.
    pub fn transform(&self, projection: Mat4) -> Mat4 {
        projection * Mat4::from_translation(self.translation)
    }
}

/// A laid-out line of text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    /// Placed glyphs, in text order.
    pub placements: Vec<GlyphPlacement>,
    /// Glyphs that were skipped, in text order.
    pub diagnostics: Vec<LayoutError>,
    /// Total pen advance from the origin.
    pub advance: f32,
}

impl TextLayout {
    /// Whether every code point was placed.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Lays out and measures text against one glyph table.
#[derive(Debug, Clone, Copy)]
pub struct TextLayoutEngine<'a> {
    table: &'a GlyphTable,
}

impl<'a> TextLayoutEngine<'a> {
    /// Create an engine for `table`.
    pub fn new(table: &'a GlyphTable) -> Self {
        Self { table }
    }

    /// The glyph table in use.
    pub fn table(&self) -> &'a GlyphTable {
        self.table
    }

    /// Lay out `text` starting at `origin` (baseline, left edge).
    pub fn layout(&self, text: &str, origin: Vec3) -> TextLayout {
        self.layout_code_points(text.chars().map(Ok), origin)
    }

    /// Lay out raw UTF-8, skipping malformed sequences.
    pub fn layout_bytes(&self, bytes: &[u8], origin: Vec3) -> TextLayout {
        self.layout_code_points(Utf8Decoder::new(bytes), origin)
    }

    /// Width and height of `text`: summed advances and tallest ascent.
    pub fn measure(&self, text: &str) -> Vec2 {
        self.measure_code_points(text.chars().map(Ok))
    }

    /// [`measure`](Self::measure) for raw UTF-8.
    pub fn measure_bytes(&self, bytes: &[u8]) -> Vec2 {
        self.measure_code_points(Utf8Decoder::new(bytes))
    }

    fn layout_code_points(
        &self,
        code_points: impl Iterator<Item = Result<char, LayoutError>>,
        origin: Vec3,
    ) -> TextLayout {
        let scale = self.table.scale();
        let mut layout = TextLayout::default();
        let mut pen_x = origin.x;

        for (ordinal, decoded) in (1u32..).zip(code_points) {
            let code_point = match decoded {
                Ok(ch) => ch as u32,
                Err(error) => {
                    report(&error);
                    layout.diagnostics.push(error);
                    continue;
                }
            };

            let glyph_index = match self.table.index_of(code_point) {
                Ok(index) => index,
                Err(error) => {
                    report(&error);
                    layout.diagnostics.push(error);
                    continue;
                }
            };

            layout.placements.push(GlyphPlacement {
                glyph_index: glyph_index as u32,
                code_point,
                translation: Vec3::new(
                    pen_x,
                    origin.y,
                    origin.z + ordinal as f32 * DEPTH_STEP,
                ),
            });
            pen_x += self.table.glyphs()[glyph_index].horizontal_advance as f32 * scale;
        }

        layout.advance = pen_x - origin.x;
        layout
    }

    fn measure_code_points(
        &self,
        code_points: impl Iterator<Item = Result<char, LayoutError>>,
    ) -> Vec2 {
        let scale = self.table.scale();
        let mut size = Vec2::ZERO;

        for decoded in code_points {
            let glyph = decoded.and_then(|ch| self.table.get(ch as u32));
            match glyph {
                Ok(glyph) => {
                    size.x += glyph.horizontal_advance as f32 * scale;
                    size.y = size.y.max(glyph.vertical_bearing as f32 * scale);
                }
                Err(error) => report(&error),
            }
        }

        size
    }
}

fn report(error: &LayoutError) {
    warn!(target: "sdf_text::layout", error = %error, "skipping glyph");
}

/// Decodes UTF-8, yielding an error per malformed sequence and carrying on.
///
/// An incomplete sequence at the end of input ends decoding. Since a code
/// point is at most four bytes, only that much is validated per step.
#[derive(Debug, Clone)]
pub struct Utf8Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Utf8Decoder<'a> {
    /// Decode `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl Iterator for Utf8Decoder<'_> {
    type Item = Result<char, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.bytes[self.offset..];
        if rest.is_empty() {
            return None;
        }

        let window = &rest[..rest.len().min(4)];
        let valid = match std::str::from_utf8(window) {
            Ok(valid) => valid,
            Err(error) if error.valid_up_to() > 0 => {
                std::str::from_utf8(&window[..error.valid_up_to()]).unwrap_or_default()
            }
            Err(error) => {
                let offset = self.offset;
                let len = error.error_len();
                self.offset = match len {
                    Some(len) => offset + len,
                    None => self.bytes.len(),
                };
                return Some(Err(LayoutError::MalformedUtf8 { offset, len }));
            }
        };

        let ch = valid.chars().next()?;
        self.offset += ch.len_utf8();
        Some(Ok(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;

    fn decode(bytes: &[u8]) -> Vec<Result<char, LayoutError>> {
        Utf8Decoder::new(bytes).collect()
    }

    #[test]
    fn test_decoder_valid() {
        assert_eq!(decode("aé€😀".as_bytes()), vec![Ok('a'), Ok('é'), Ok('€'), Ok('😀')]);
        assert!(decode(b"").is_empty());
    }

    #[test]
    fn test_decoder_skips_invalid_byte() {
        assert_eq!(
            decode(b"A\xFFB"),
            vec![
                Ok('A'),
                Err(LayoutError::MalformedUtf8 { offset: 1, len: Some(1) }),
                Ok('B'),
            ]
        );
    }

    #[test]
    fn test_decoder_truncated_sequence_mid_input() {
        // E2 82 is the start of '€' cut short by 'x'.
        assert_eq!(
            decode(b"\xE2\x82xyz"),
            vec![
                Err(LayoutError::MalformedUtf8 { offset: 0, len: Some(2) }),
                Ok('x'),
                Ok('y'),
                Ok('z'),
            ]
        );
    }

    #[test]
    fn test_decoder_incomplete_tail() {
        assert_eq!(
            decode(b"ok\xE2\x82"),
            vec![
                Ok('o'),
                Ok('k'),
                Err(LayoutError::MalformedUtf8 { offset: 2, len: None }),
            ]
        );
    }

    #[test]
    fn test_layout_advances_pen() {
        let table = sample_table();
        let engine = TextLayoutEngine::new(&table);
        let layout = engine.layout("ABC", Vec3::new(10.0, 20.0, 0.5));

        assert!(layout.is_clean());
        let xs: Vec<f32> = layout.placements.iter().map(|p| p.translation.x).collect();
        // Advances 10, 12, 14 at scale 0.5.
        assert_eq!(xs, vec![10.0, 15.0, 21.0]);
        assert_eq!(layout.advance, 18.0);
        assert!(layout.placements.iter().all(|p| p.translation.y == 20.0));
        assert_eq!(layout.placements[1].glyph_index, 1);
        assert_eq!(layout.placements[1].index_range(), 4..8);
    }

    #[test]
    fn test_depth_increases_per_code_point() {
        let table = sample_table();
        let layout = TextLayoutEngine::new(&table).layout("AzB", Vec3::ZERO);

        assert_eq!(layout.placements.len(), 2);
        assert_eq!(layout.placements[0].translation.z, DEPTH_STEP);
        // 'z' was skipped but still counted.
        assert_eq!(layout.placements[1].translation.z, 3.0 * DEPTH_STEP);
    }

    #[test]
    fn test_out_of_range_skipped() {
        let table = sample_table();
        let layout = TextLayoutEngine::new(&table).layout("AzB", Vec3::ZERO);

        assert!(!layout.is_clean());
        assert_eq!(
            layout.diagnostics,
            vec![LayoutError::OutOfRange {
                code_point: 'z' as u32,
                start: 'A' as u32,
                end: 'D' as u32,
            }]
        );
        let code_points: Vec<u32> = layout.placements.iter().map(|p| p.code_point).collect();
        assert_eq!(code_points, vec!['A' as u32, 'B' as u32]);
        // Skipped glyphs do not advance the pen.
        assert_eq!(layout.placements[1].translation.x, 5.0);
    }

    #[test]
    fn test_layout_bytes_reports_malformed() {
        let table = sample_table();
        let layout = TextLayoutEngine::new(&table).layout_bytes(b"A\xC0B", Vec3::ZERO);

        assert_eq!(layout.placements.len(), 2);
        assert_eq!(
            layout.diagnostics,
            vec![LayoutError::MalformedUtf8 { offset: 1, len: Some(1) }]
        );
    }

    #[test]
    fn test_measure() {
        let table = sample_table();
        let engine = TextLayoutEngine::new(&table);

        assert_eq!(engine.measure(""), Vec2::ZERO);
        assert_eq!(engine.measure("A"), Vec2::new(5.0, 5.0));
        assert_eq!(engine.measure("AB?C"), Vec2::new(18.0, 5.0));
        assert_eq!(engine.measure_bytes(b"A\xFF"), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_transform_applies_translation() {
        let placement = GlyphPlacement {
            glyph_index: 0,
            code_point: 'A' as u32,
            translation: Vec3::new(3.0, 4.0, 0.0),
        };
        let projection = Mat4::from_scale(Vec3::splat(2.0));
        let point = placement.transform(projection).transform_point3(Vec3::ZERO);
        assert_eq!(point, Vec3::new(6.0, 8.0, 0.0));
    }
}
