//! Font and atlas configuration.
//!
//! Configuration is usually built in code, but can also be read from a TOML
//! file listing the fonts to register:
//!
//! ```toml
//! [atlas]
//! padding = 12
//! sample_radius = 10
//!
//! [[fonts]]
//! font_file = "fonts/DejaVuSans.ttf"
//! point_size = 14
//! sdf_width = 0.5
//! sdf_edge = 0.1
//! char_start = 32
//! char_count = 95
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigurationError};

/// Raster size (in points) at which glyphs are rendered into the atlas.
pub const DEFAULT_BASE_RASTER_SIZE: u32 = 32;

/// Empty border around every glyph cell, in atlas pixels.
pub const DEFAULT_PADDING: u32 = 12;

/// Half-width of the distance-field search window, in atlas pixels.
pub const DEFAULT_SAMPLE_RADIUS: u32 = 10;

/// Resolution used to convert the base raster size from points to pixels.
pub const DEFAULT_RASTER_DPI: u32 = 128;

/// Largest accepted padding and sample radius.
pub const MAX_CELL_MARGIN: u32 = 255;

/// Parameters shared by every atlas built with the same builder.
///
/// Changing any of these invalidates existing cache files, since the packed
/// layout depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasParams {
    /// Point size glyphs are rasterized at.
    pub base_raster_size: u32,
    /// Padding on every side of a glyph cell.
    pub padding: u32,
    /// Distance-field sample radius.
    pub sample_radius: u32,
    /// Dots per inch for the point-to-pixel conversion.
    pub raster_dpi: u32,
}

impl Default for AtlasParams {
    fn default() -> Self {
        Self {
            base_raster_size: DEFAULT_BASE_RASTER_SIZE,
            padding: DEFAULT_PADDING,
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            raster_dpi: DEFAULT_RASTER_DPI,
        }
    }
}

impl AtlasParams {
    /// Set the base raster size.
    #[must_use]
    pub fn with_base_raster_size(mut self, size: u32) -> Self {
        self.base_raster_size = size;
        self
    }

    /// Set the cell padding.
    #[must_use]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Set the distance-field sample radius.
    #[must_use]
    pub fn with_sample_radius(mut self, radius: u32) -> Self {
        self.sample_radius = radius;
        self
    }

    /// Set the raster resolution.
    #[must_use]
    pub fn with_raster_dpi(mut self, dpi: u32) -> Self {
        self.raster_dpi = dpi;
        self
    }

    /// Pixel size handed to the glyph source.
    pub fn raster_size_px(&self) -> f32 {
        self.base_raster_size as f32 * self.raster_dpi as f32 / 72.0
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.base_raster_size == 0 {
            return Err(ConfigurationError::InvalidFontConfig(
                "base_raster_size must be greater than zero".into(),
            ));
        }
        if self.raster_dpi == 0 {
            return Err(ConfigurationError::InvalidFontConfig(
                "raster_dpi must be greater than zero".into(),
            ));
        }
        if self.padding > MAX_CELL_MARGIN {
            return Err(ConfigurationError::InvalidFontConfig(format!(
                "padding {} exceeds {MAX_CELL_MARGIN}",
                self.padding
            )));
        }
        if self.sample_radius > MAX_CELL_MARGIN {
            return Err(ConfigurationError::InvalidFontConfig(format!(
                "sample_radius {} exceeds {MAX_CELL_MARGIN}",
                self.sample_radius
            )));
        }
        Ok(())
    }
}

/// Description of one font registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Path of the font file. The atlas cache lives next to it.
    pub font_file: PathBuf,
    /// Point size text is drawn at.
    pub point_size: u32,
    /// Shading width passed to the SDF shader.
    #[serde(default = "default_sdf_width")]
    pub sdf_width: f32,
    /// Shading edge passed to the SDF shader.
    #[serde(default = "default_sdf_edge")]
    pub sdf_edge: f32,
    /// First code point in the atlas.
    #[serde(default = "default_char_start")]
    pub char_start: u32,
    /// Number of consecutive code points in the atlas.
    #[serde(default = "default_char_count")]
    pub char_count: u32,
}

fn default_sdf_width() -> f32 {
    0.5
}

fn default_sdf_edge() -> f32 {
    0.1
}

fn default_char_start() -> u32 {
    32
}

fn default_char_count() -> u32 {
    95
}

impl FontConfig {
    /// Create a configuration for printable ASCII at the given point size.
    pub fn new(font_file: impl Into<PathBuf>, point_size: u32) -> Self {
        Self {
            font_file: font_file.into(),
            point_size,
            sdf_width: default_sdf_width(),
            sdf_edge: default_sdf_edge(),
            char_start: default_char_start(),
            char_count: default_char_count(),
        }
    }

    /// Set the character range.
    #[must_use]
    pub fn with_char_range(mut self, start: u32, count: u32) -> Self {
        self.char_start = start;
        self.char_count = count;
        self
    }

    /// Set the SDF shading parameters.
    #[must_use]
    pub fn with_sdf(mut self, width: f32, edge: f32) -> Self {
        self.sdf_width = width;
        self.sdf_edge = edge;
        self
    }

    /// One past the last code point in the atlas.
    pub fn char_end(&self) -> u32 {
        self.char_start.saturating_add(self.char_count)
    }

    /// Iterate the configured code points in ascending order.
    pub fn code_points(&self) -> std::ops::Range<u32> {
        self.char_start..self.char_end()
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.point_size == 0 {
            return Err(ConfigurationError::InvalidFontConfig(
                "point_size must be greater than zero".into(),
            ));
        }
        if self.char_count == 0 {
            return Err(ConfigurationError::InvalidFontConfig(
                "char_count must be greater than zero".into(),
            ));
        }
        if self.char_start.checked_add(self.char_count).is_none() {
            return Err(ConfigurationError::InvalidFontConfig(format!(
                "character range {}+{} overflows",
                self.char_start, self.char_count
            )));
        }
        if !self.sdf_width.is_finite() || !self.sdf_edge.is_finite() {
            return Err(ConfigurationError::InvalidFontConfig(
                "sdf_width and sdf_edge must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// A configuration file: shared atlas parameters and the fonts to register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdfTextConfig {
    /// Atlas parameters.
    #[serde(default)]
    pub atlas: AtlasParams,
    /// Fonts to register, in registration order.
    #[serde(default)]
    pub fonts: Vec<FontConfig>,
}

impl SdfTextConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Resolve relative font paths against an asset root directory.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        for font in &mut self.fonts {
            if font.font_file.is_relative() {
                font.font_file = root.join(&font.font_file);
            }
        }
        self
    }

    /// Validate the atlas parameters and every font.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.atlas.validate()?;
        self.fonts.iter().try_for_each(FontConfig::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let params = AtlasParams::default();
        assert_eq!(params.base_raster_size, 32);
        assert_eq!(params.padding, 12);
        assert_eq!(params.sample_radius, 10);
        assert!((params.raster_size_px() - 32.0 * 128.0 / 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_parse_toml() {
        let config = SdfTextConfig::from_toml_str(
            r#"
            [atlas]
            padding = 8

            [[fonts]]
            font_file = "fonts/mono.ttf"
            point_size = 14
            sdf_width = 0.45
            "#,
        )
        .unwrap();

        assert_eq!(config.atlas.padding, 8);
        assert_eq!(config.atlas.sample_radius, DEFAULT_SAMPLE_RADIUS);
        assert_eq!(config.fonts.len(), 1);
        let font = &config.fonts[0];
        assert_eq!(font.point_size, 14);
        assert_eq!(font.sdf_width, 0.45);
        assert_eq!(font.sdf_edge, 0.1);
        assert_eq!(font.code_points(), 32..127);
    }

    #[test]
    fn test_asset_root_resolution() {
        let config = SdfTextConfig::from_toml_str(
            r#"
            [[fonts]]
            font_file = "fonts/a.ttf"
            point_size = 12

            [[fonts]]
            font_file = "/abs/b.ttf"
            point_size = 12
            "#,
        )
        .unwrap()
        .with_asset_root("/assets");

        assert_eq!(config.fonts[0].font_file, PathBuf::from("/assets/fonts/a.ttf"));
        assert_eq!(config.fonts[1].font_file, PathBuf::from("/abs/b.ttf"));
    }

    #[test]
    fn test_rejects_empty_range() {
        let err = SdfTextConfig::from_toml_str(
            r#"
            [[fonts]]
            font_file = "a.ttf"
            point_size = 12
            char_count = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_overflowing_range() {
        let config = FontConfig::new("a.ttf", 12).with_char_range(u32::MAX - 1, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_point_size() {
        assert!(FontConfig::new("a.ttf", 0).validate().is_err());
    }

    #[test]
    fn test_rejects_huge_padding_and_radius() {
        let err = SdfTextConfig::from_toml_str(
            r#"
            [atlas]
            padding = 4294967295
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let params = AtlasParams::default().with_sample_radius(MAX_CELL_MARGIN + 1);
        assert!(params.validate().is_err());
        let params = AtlasParams::default()
            .with_padding(MAX_CELL_MARGIN)
            .with_sample_radius(MAX_CELL_MARGIN);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        let err = SdfTextConfig::from_toml_str("[[fonts]]\npoint_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
