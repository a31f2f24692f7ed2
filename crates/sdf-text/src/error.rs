//! Error types for atlas construction, layout and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// The atlas inputs are inconsistent with what the builder supports.
///
/// These errors abort atlas construction; no glyph table is produced.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The cached atlas is not a greyscale image.
    #[error("atlas cache {path:?} has unsupported color type {color_type}, expected 8-bit greyscale")]
    UnsupportedColorType { path: PathBuf, color_type: String },

    /// The cached atlas is greyscale but not 8 bits per sample.
    #[error("atlas cache {path:?} has unsupported bit depth {bit_depth}, expected 8")]
    UnsupportedBitDepth { path: PathBuf, bit_depth: u16 },

    /// The cached atlas does not match the layout computed from the font.
    #[error(
        "atlas cache {path:?} is {found_width}x{found_height}, layout requires {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        found_width: u32,
        found_height: u32,
    },

    /// A font or atlas parameter is out of range.
    #[error("invalid font configuration: {0}")]
    InvalidFontConfig(String),
}

/// The glyph source could not produce a glyph.
#[derive(Error, Debug)]
pub enum RasterizationError {
    /// The font file could not be read.
    #[error("font file {path:?} not found: {source}")]
    FontNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The font file was read but could not be parsed.
    #[error("font file {path:?} could not be parsed: {reason}")]
    InvalidFont { path: PathBuf, reason: String },

    /// The font has no glyph for the code point.
    #[error("font {path:?} has no glyph for code point U+{code_point:04X}")]
    GlyphNotFound { path: PathBuf, code_point: u32 },
}

/// Errors that abort atlas construction or font registration.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Invalid configuration or incompatible cache file.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A glyph could not be rasterized.
    #[error(transparent)]
    Rasterization(#[from] RasterizationError),

    /// Reading or writing the cache image failed.
    #[error("atlas cache {path:?} I/O failed: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The cache file is not a readable PNG.
    #[error("atlas cache {path:?} could not be decoded: {source}")]
    CacheDecode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },
}

/// Result type for atlas operations.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// A recoverable problem with a single glyph during layout.
///
/// The offending glyph is skipped and the rest of the line is still laid out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The code point is outside the atlas character range.
    #[error("code point U+{code_point:04X} outside atlas range [{start}, {end})")]
    OutOfRange { code_point: u32, start: u32, end: u32 },

    /// The input bytes are not valid UTF-8 at `offset`.
    ///
    /// `len` is `None` when the input ends inside an incomplete sequence.
    #[error("malformed UTF-8 at byte {offset} (length {len:?})")]
    MalformedUtf8 { offset: usize, len: Option<usize> },
}

/// Errors loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but holds out-of-range values.
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}
