//! Atlas caching.
//!
//! A cache entry holds only the atlas pixels. Glyph metrics and UV
//! rectangles are always recomputed from the font, so a cache hit skips the
//! distance-field pass but nothing else.
//!
//! [`PngAtlasCache`] stores each atlas as an 8-bit greyscale PNG next to its
//! font (`DejaVuSans.ttf` → `DejaVuSans.ttf.png`). [`MemoryAtlasCache`] keeps
//! entries in a map and never touches the filesystem.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{ExtendedColorType, ImageError, ImageFormat};
use tracing::debug;

use crate::atlas_image::AtlasImage;
use crate::error::{AtlasError, AtlasResult, ConfigurationError};

/// Storage for built atlas images, keyed by font file.
pub trait AtlasCache {
    /// Whether an entry exists for `font_file`.
    fn exists(&self, font_file: &Path) -> bool;

    /// Load the entry for `font_file`.
    ///
    /// Anything other than 8-bit greyscale is a
    /// [`ConfigurationError`](crate::error::ConfigurationError).
    fn load(&self, font_file: &Path) -> AtlasResult<AtlasImage>;

    /// Store `image` as the entry for `font_file`, replacing any previous one.
    fn store(&mut self, font_file: &Path, image: &AtlasImage) -> AtlasResult<()>;
}

impl<C: AtlasCache + ?Sized> AtlasCache for &mut C {
    fn exists(&self, font_file: &Path) -> bool {
        (**self).exists(font_file)
    }

    fn load(&self, font_file: &Path) -> AtlasResult<AtlasImage> {
        (**self).load(font_file)
    }

    fn store(&mut self, font_file: &Path, image: &AtlasImage) -> AtlasResult<()> {
        (**self).store(font_file, image)
    }
}

impl<C: AtlasCache + ?Sized> AtlasCache for Box<C> {
    fn exists(&self, font_file: &Path) -> bool {
        (**self).exists(font_file)
    }

    fn load(&self, font_file: &Path) -> AtlasResult<AtlasImage> {
        (**self).load(font_file)
    }

    fn store(&mut self, font_file: &Path, image: &AtlasImage) -> AtlasResult<()> {
        (**self).store(font_file, image)
    }
}

/// Cache file path for a font: the font path with `.png` appended.
pub fn cache_path(font_file: &Path) -> PathBuf {
    let mut path = font_file.as_os_str().to_owned();
    path.push(".png");
    PathBuf::from(path)
}

/// PNG files stored alongside the fonts.
///
/// The entry is keyed by font path only. Registering the same font twice with
/// different character ranges reuses the first atlas and fails with
/// [`ConfigurationError::DimensionMismatch`]; give each range its own font
/// path (a copy or a symlink) to keep separate caches.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngAtlasCache;

impl PngAtlasCache {
    /// Create a PNG cache.
    pub fn new() -> Self {
        Self
    }
}

impl AtlasCache for PngAtlasCache {
    fn exists(&self, font_file: &Path) -> bool {
        cache_path(font_file).is_file()
    }

    fn load(&self, font_file: &Path) -> AtlasResult<AtlasImage> {
        let path = cache_path(font_file);
        let file = File::open(&path).map_err(|e| AtlasError::CacheIo {
            path: path.clone(),
            source: ImageError::IoError(e),
        })?;
        let cache_decode = |source: png::DecodingError| AtlasError::CacheDecode {
            path: path.clone(),
            source,
        };

        // IHDR is checked before decoding; no transformations are applied.
        let mut reader = png::Decoder::new(BufReader::new(file))
            .read_info()
            .map_err(cache_decode)?;
        let info = reader.info();
        let (width, height) = (info.width, info.height);
        match (info.color_type, info.bit_depth) {
            (png::ColorType::Grayscale, png::BitDepth::Eight) => {}
            (png::ColorType::Grayscale, depth) => {
                return Err(unsupported_depth(&path, depth as u16));
            }
            (other, _) => {
                return Err(ConfigurationError::UnsupportedColorType {
                    path: path.clone(),
                    color_type: format!("{other:?}"),
                }
                .into());
            }
        }

        let size = reader
            .output_buffer_size()
            .ok_or_else(|| cache_decode(png::DecodingError::LimitsExceeded))?;
        let mut pixels = vec![0; size];
        let frame = reader.next_frame(&mut pixels).map_err(cache_decode)?;
        pixels.truncate(frame.buffer_size());

        debug!(
            target: "sdf_text::cache",
            path = ?path,
            width,
            height,
            "loaded atlas cache"
        );

        AtlasImage::from_raw(width, height, pixels).ok_or_else(|| {
            ConfigurationError::UnsupportedColorType {
                path: path.clone(),
                color_type: "Grayscale with unexpected sample layout".into(),
            }
            .into()
        })
    }

    fn store(&mut self, font_file: &Path, image: &AtlasImage) -> AtlasResult<()> {
        let path = cache_path(font_file);
        image::save_buffer_with_format(
            &path,
            image.pixels(),
            image.width(),
            image.height(),
            ExtendedColorType::L8,
            ImageFormat::Png,
        )
        .map_err(|source| AtlasError::CacheIo {
            path: path.clone(),
            source,
        })?;

        debug!(
            target: "sdf_text::cache",
            path = ?path,
            width = image.width(),
            height = image.height(),
            "stored atlas cache"
        );
        Ok(())
    }
}

fn unsupported_depth(path: &Path, bit_depth: u16) -> AtlasError {
    ConfigurationError::UnsupportedBitDepth {
        path: path.to_path_buf(),
        bit_depth,
    }
    .into()
}

/// In-process cache keyed by font path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAtlasCache {
    entries: HashMap<PathBuf, AtlasImage>,
}

impl MemoryAtlasCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry directly.
    pub fn insert(&mut self, font_file: impl Into<PathBuf>, image: AtlasImage) {
        self.entries.insert(font_file.into(), image);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AtlasCache for MemoryAtlasCache {
    fn exists(&self, font_file: &Path) -> bool {
        self.entries.contains_key(font_file)
    }

    fn load(&self, font_file: &Path) -> AtlasResult<AtlasImage> {
        self.entries
            .get(font_file)
            .cloned()
            .ok_or_else(|| AtlasError::CacheIo {
                path: font_file.to_path_buf(),
                source: ImageError::IoError(std::io::ErrorKind::NotFound.into()),
            })
    }

    fn store(&mut self, font_file: &Path, image: &AtlasImage) -> AtlasResult<()> {
        self.entries.insert(font_file.to_path_buf(), image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> AtlasImage {
        let pixels = (0..width * height).map(|i| (i * 7 % 256) as u8).collect();
        AtlasImage::from_raw(width, height, pixels).unwrap()
    }

    fn write_png(
        path: &Path,
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) {
        let file = std::io::BufWriter::new(File::create(path).unwrap());
        let mut encoder = png::Encoder::new(file, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }

    #[test]
    fn test_cache_path_appends_extension() {
        assert_eq!(
            cache_path(Path::new("fonts/DejaVuSans.ttf")),
            PathBuf::from("fonts/DejaVuSans.ttf.png")
        );
    }

    #[test]
    fn test_png_round_trip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        let mut cache = PngAtlasCache::new();
        assert!(!cache.exists(&font));

        // Non-square so a transposition or row flip would show.
        let image = gradient(7, 5);
        cache.store(&font, &image).unwrap();

        assert!(cache.exists(&font));
        assert!(dir.path().join("font.ttf.png").is_file());
        assert_eq!(cache.load(&font).unwrap(), image);
    }

    #[test]
    fn test_png_rejects_four_bit_grey() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        write_png(
            &cache_path(&font),
            4,
            2,
            png::ColorType::Grayscale,
            png::BitDepth::Four,
            &[0x12, 0x34, 0x56, 0x78],
        );

        let err = PngAtlasCache.load(&font).unwrap_err();
        assert!(matches!(
            err,
            AtlasError::Configuration(ConfigurationError::UnsupportedBitDepth { bit_depth: 4, .. })
        ));
    }

    #[test]
    fn test_png_rejects_low_bit_depths_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");

        for (depth, bits) in [(png::BitDepth::One, 1), (png::BitDepth::Two, 2)] {
            // Four pixels per row fit in one byte at both depths.
            write_png(&cache_path(&font), 4, 1, png::ColorType::Grayscale, depth, &[0xA5]);

            let err = PngAtlasCache.load(&font).unwrap_err();
            match err {
                AtlasError::Configuration(ConfigurationError::UnsupportedBitDepth {
                    bit_depth,
                    ..
                }) => assert_eq!(bit_depth, bits),
                other => panic!("{bits}-bit grey accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_png_truncated_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        std::fs::write(cache_path(&font), b"\x89PNG\r\n\x1a\n").unwrap();

        let err = PngAtlasCache.load(&font).unwrap_err();
        assert!(matches!(err, AtlasError::CacheDecode { .. }));
    }

    #[test]
    fn test_png_rejects_sixteen_bit_grey() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        write_png(
            &cache_path(&font),
            2,
            2,
            png::ColorType::Grayscale,
            png::BitDepth::Sixteen,
            &[0; 8],
        );

        let err = PngAtlasCache.load(&font).unwrap_err();
        assert!(matches!(
            err,
            AtlasError::Configuration(ConfigurationError::UnsupportedBitDepth { bit_depth: 16, .. })
        ));
    }

    #[test]
    fn test_png_rejects_grey_alpha_and_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");

        for (color, bytes_per_pixel) in [
            (png::ColorType::GrayscaleAlpha, 2),
            (png::ColorType::Rgb, 3),
        ] {
            write_png(
                &cache_path(&font),
                2,
                2,
                color,
                png::BitDepth::Eight,
                &vec![0; 4 * bytes_per_pixel],
            );

            let err = PngAtlasCache.load(&font).unwrap_err();
            assert!(
                matches!(
                    err,
                    AtlasError::Configuration(ConfigurationError::UnsupportedColorType { .. })
                ),
                "{color:?} accepted"
            );
        }
    }

    #[test]
    fn test_png_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PngAtlasCache.load(&dir.path().join("absent.ttf")).unwrap_err();
        assert!(matches!(err, AtlasError::CacheIo { .. }));
    }

    #[test]
    fn test_store_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("missing").join("font.ttf");
        let err = PngAtlasCache.store(&font, &gradient(2, 2)).unwrap_err();
        assert!(matches!(err, AtlasError::CacheIo { .. }));
    }

    #[test]
    fn test_memory_cache() {
        let mut cache = MemoryAtlasCache::new();
        let font = Path::new("mem.ttf");
        assert!(!cache.exists(font));
        assert!(cache.load(font).is_err());

        cache.store(font, &gradient(3, 3)).unwrap();
        assert!(cache.exists(font));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.load(font).unwrap(), gradient(3, 3));
    }
}
