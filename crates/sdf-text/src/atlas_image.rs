//! The packed 8-bit distance-field texture.

/// A single-channel 8-bit image, row-major, row 0 at the top.
///
/// Values around 127 sit on a glyph outline; higher is inside.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtlasImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasImage {
    /// Create a zero-filled image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing pixel data.
    ///
    /// Returns `None` if `pixels` is not exactly `width * height` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Raw pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel bytes.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Read one pixel.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Copy a `width * height` block into the image with its top-left corner
    /// at `(x, y)`. Parts falling outside the image are dropped.
    pub fn blit(&mut self, x: u32, y: u32, width: u32, height: u32, src: &[u8]) {
        debug_assert_eq!(src.len(), width as usize * height as usize);
        let copy_width = width.min(self.width.saturating_sub(x)) as usize;
        if copy_width == 0 {
            return;
        }

        for row in 0..height.min(self.height.saturating_sub(y)) {
            let src_start = (row * width) as usize;
            let dst_start = (y + row) as usize * self.width as usize + x as usize;
            self.pixels[dst_start..dst_start + copy_width]
                .copy_from_slice(&src[src_start..src_start + copy_width]);
        }
    }
}
