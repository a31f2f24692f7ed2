//! Deterministic fixed-column grid packing.
//!
//! Glyph cells are placed row-major in ascending code-point order, with
//! `floor(sqrt(count))` cells per row. A row is as tall as its tallest cell;
//! the atlas is as wide as its widest row.
//!
//! The cache relies on this function being pure: a cached atlas stores only
//! pixels, and the UV rectangles are recovered by packing the freshly
//! rasterized glyph dimensions again. Any change to the algorithm makes
//! existing cache files unusable.

/// Unpadded glyph bitmap size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl GlyphDimensions {
    /// Create glyph dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A padded glyph cell in the atlas, in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasCell {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Padded width.
    pub width: u32,
    /// Padded height.
    pub height: u32,
}

/// Result of packing a glyph range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackingLayout {
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// One cell per glyph, in input order.
    pub cells: Vec<AtlasCell>,
}

impl PackingLayout {
    /// Number of glyphs in the layout.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the layout holds no glyphs.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Normalized texture rectangle of the cell at `index`.
    pub fn uv_rect(&self, index: usize) -> Option<UvRect> {
        self.cells
            .get(index)
            .map(|cell| UvRect::from_cell(cell, self.width, self.height))
    }
}

/// Number of cells per atlas row for `count` glyphs.
pub fn columns(count: usize) -> usize {
    count.isqrt()
}

/// Pack glyph cells into a single atlas.
///
/// Each cell is the glyph size plus `padding` on every side. The output
/// depends only on the arguments.
pub fn pack(padding: u32, dimensions: &[GlyphDimensions]) -> PackingLayout {
    let columns = columns(dimensions.len());
    if columns == 0 {
        return PackingLayout::default();
    }

    let mut cells = Vec::with_capacity(dimensions.len());
    let mut atlas_width = 0;
    let mut atlas_height = 0;

    let mut cursor_x = 0;
    let mut row_height = 0;

    for (index, glyph) in dimensions.iter().enumerate() {
        let cell = AtlasCell {
            x: cursor_x,
            y: atlas_height,
            width: glyph.width + 2 * padding,
            height: glyph.height + 2 * padding,
        };
        cells.push(cell);

        cursor_x += cell.width;
        row_height = row_height.max(cell.height);

        if (index + 1) % columns == 0 {
            atlas_width = atlas_width.max(cursor_x);
            atlas_height += row_height;
            cursor_x = 0;
            row_height = 0;
        }
    }

    // Partial last row.
    if dimensions.len() % columns != 0 {
        atlas_width = atlas_width.max(cursor_x);
        atlas_height += row_height;
    }

    PackingLayout {
        width: atlas_width,
        height: atlas_height,
        cells,
    }
}

/// A 2D texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexCoord {
    /// Horizontal coordinate.
    pub u: f32,
    /// Vertical coordinate.
    pub v: f32,
}

impl TexCoord {
    /// Create a texture coordinate.
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// Normalized texture rectangle of a glyph cell.
///
/// `min` is the bottom-left corner and `max` the top-right one. The vertical
/// axis is inverted relative to pixel rows: `min.v` is the cell's bottom row
/// (`(y + height) / atlas_height`) and `max.v` its top row
/// (`y / atlas_height`), so `min.v > max.v`. Glyph quads map their top edge
/// to `max.v`, which keeps text upright; do not swap the two.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    /// Bottom-left corner.
    pub min: TexCoord,
    /// Top-right corner.
    pub max: TexCoord,
}

impl UvRect {
    /// Texture rectangle of `cell` in an atlas of the given size.
    pub fn from_cell(cell: &AtlasCell, atlas_width: u32, atlas_height: u32) -> Self {
        let u = |x: u32| normalize(x, atlas_width);
        let v = |y: u32| normalize(y, atlas_height);
        Self {
            min: TexCoord::new(u(cell.x), v(cell.y + cell.height)),
            max: TexCoord::new(u(cell.x + cell.width), v(cell.y)),
        }
    }

    /// Whether two rectangles share any area.
    pub fn overlaps(&self, other: &UvRect) -> bool {
        self.min.u < other.max.u
            && other.min.u < self.max.u
            && self.max.v < other.min.v
            && other.max.v < self.min.v
    }
}

fn normalize(value: u32, extent: u32) -> f32 {
    if extent == 0 {
        0.0
    } else {
        value as f32 / extent as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(list: &[(u32, u32)]) -> Vec<GlyphDimensions> {
        list.iter()
            .map(|&(w, h)| GlyphDimensions::new(w, h))
            .collect()
    }

    #[test]
    fn test_columns_is_floor_sqrt() {
        assert_eq!(columns(0), 0);
        assert_eq!(columns(1), 1);
        assert_eq!(columns(3), 1);
        assert_eq!(columns(4), 2);
        assert_eq!(columns(95), 9);
        assert_eq!(columns(100), 10);
    }

    #[test]
    fn test_empty_input() {
        let layout = pack(12, &[]);
        assert_eq!(layout, PackingLayout::default());
        assert!(layout.is_empty());
    }

    #[test]
    fn test_full_grid() {
        let layout = pack(1, &dims(&[(2, 2), (4, 1), (1, 5), (3, 3)]));

        // Two columns; padded sizes (4,4) (6,3) / (3,7) (5,5).
        assert_eq!(layout.cells[0], AtlasCell { x: 0, y: 0, width: 4, height: 4 });
        assert_eq!(layout.cells[1], AtlasCell { x: 4, y: 0, width: 6, height: 3 });
        assert_eq!(layout.cells[2], AtlasCell { x: 0, y: 4, width: 3, height: 7 });
        assert_eq!(layout.cells[3], AtlasCell { x: 3, y: 4, width: 5, height: 5 });
        assert_eq!(layout.width, 10);
        assert_eq!(layout.height, 11);
    }

    #[test]
    fn test_partial_last_row_counts_toward_height() {
        // Five glyphs, two columns: rows of 2, 2 and 1.
        let layout = pack(0, &dims(&[(1, 1), (1, 1), (1, 2), (1, 2), (1, 3)]));
        assert_eq!(layout.height, 1 + 2 + 3);
        assert_eq!(layout.cells[4].y, 3);
        assert_eq!(layout.width, 2);
    }

    #[test]
    fn test_wide_partial_row_extends_width() {
        let layout = pack(0, &dims(&[(1, 1), (1, 1), (1, 1), (1, 1), (9, 1)]));
        assert_eq!(layout.width, 9);
    }

    #[test]
    fn test_deterministic() {
        let input: Vec<GlyphDimensions> = (0..95u32)
            .map(|i| GlyphDimensions::new(i * 7 % 23, i * 13 % 31))
            .collect();
        let a = pack(12, &input);
        let b = pack(12, &input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_uv_rects_never_overlap() {
        let input: Vec<GlyphDimensions> = (0..40u32)
            .map(|i| GlyphDimensions::new(1 + i % 5, 1 + i % 7))
            .collect();
        let layout = pack(2, &input);

        let rects: Vec<UvRect> = (0..layout.len()).filter_map(|i| layout.uv_rect(i)).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_uv_vertical_axis_is_inverted() {
        let cell = AtlasCell { x: 10, y: 20, width: 30, height: 40 };
        let uv = UvRect::from_cell(&cell, 100, 200);

        assert_eq!(uv.min, TexCoord::new(0.1, 0.3));
        assert_eq!(uv.max, TexCoord::new(0.4, 0.1));
        assert!(uv.min.v > uv.max.v);
    }

    #[test]
    fn test_uv_zero_extent_is_not_nan() {
        let cell = AtlasCell::default();
        let uv = UvRect::from_cell(&cell, 0, 0);
        assert_eq!(uv, UvRect::default());
    }
}
