//! Integration tests for font registration, caching and layout.

mod common;

use std::fs::File;
use std::io::BufWriter;

use common::{RectSource, init_tracing, test_params};
use sdf_text::cache::cache_path;
use sdf_text::glam::{Vec2, Vec3};
use sdf_text::{
    AtlasError, ConfigurationError, FontConfig, FontRegistry, LayoutError, MemoryAtlasCache,
    PngAtlasCache, RasterizationError, SdfTextConfig,
};

fn registry<C: sdf_text::AtlasCache>(cache: C) -> FontRegistry<RectSource, C> {
    FontRegistry::new(RectSource::default(), cache).with_params(test_params())
}

fn ascii(font_file: impl Into<std::path::PathBuf>) -> FontConfig {
    FontConfig::new(font_file, 14)
}

#[test]
fn test_png_cache_round_trip_gives_identical_tables() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let font_file = dir.path().join("rect.ttf");

    let mut first = registry(PngAtlasCache::new());
    let id = first.add_font(ascii(&font_file)).unwrap();
    assert!(!first.font(id).unwrap().from_cache());
    assert!(cache_path(&font_file).is_file());

    let mut second = registry(PngAtlasCache::new());
    let cached = second.add_font(ascii(&font_file)).unwrap();
    let cached_table = second.font(cached).unwrap();
    assert!(cached_table.from_cache());

    let fresh_table = first.font(id).unwrap();
    assert_eq!(cached_table.glyphs(), fresh_table.glyphs());
    assert_eq!(cached_table.atlas_dimensions(), fresh_table.atlas_dimensions());
    assert_eq!(
        second.take_atlas_image(cached),
        first.take_atlas_image(id)
    );
}

#[test]
fn test_four_bit_cache_is_rejected() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let font_file = dir.path().join("rect.ttf");

    let file = BufWriter::new(File::create(cache_path(&font_file)).unwrap());
    let mut encoder = png::Encoder::new(file, 8, 8);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Four);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[0x77; 32]).unwrap();
    drop(writer);

    let mut fonts = registry(PngAtlasCache::new());
    let err = fonts.add_font(ascii(&font_file)).unwrap_err();

    assert!(matches!(
        err,
        AtlasError::Configuration(ConfigurationError::UnsupportedBitDepth { bit_depth: 4, .. })
    ));
    assert!(fonts.is_empty());
}

#[test]
fn test_png_cache_is_keyed_by_font_path_only() {
    let dir = tempfile::tempdir().unwrap();
    let font_file = dir.path().join("rect.ttf");

    let mut fonts = registry(PngAtlasCache::new());
    fonts.add_font(ascii(&font_file)).unwrap();

    // A second range of the same font finds the first range's atlas.
    let lowercase = ascii(&font_file).with_char_range('a' as u32, 26);
    let err = fonts.add_font(lowercase.clone()).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Configuration(ConfigurationError::DimensionMismatch { .. })
    ));
    assert_eq!(fonts.len(), 1);

    // A separate path keeps a separate cache entry.
    let copy = dir.path().join("rect-lower.ttf");
    let lowercase = FontConfig {
        font_file: copy.clone(),
        ..lowercase
    };
    fonts.add_font(lowercase).unwrap();
    assert!(cache_path(&copy).is_file());
    assert_eq!(fonts.len(), 2);
}

#[test]
fn test_oversized_padding_is_rejected_before_packing() {
    let mut fonts = FontRegistry::new(RectSource::default(), MemoryAtlasCache::new())
        .with_params(test_params().with_padding(u32::MAX));

    let err = fonts.add_font(ascii("rect.ttf")).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Configuration(ConfigurationError::InvalidFontConfig(_))
    ));
    assert!(fonts.is_empty());
}

#[test]
fn test_missing_glyph_leaves_no_entry() {
    let source = RectSource {
        missing: vec!['Q' as u32],
    };
    let mut fonts = FontRegistry::new(source, MemoryAtlasCache::new()).with_params(test_params());

    let err = fonts.add_font(ascii("rect.ttf")).unwrap_err();
    assert!(matches!(
        err,
        AtlasError::Rasterization(RasterizationError::GlyphNotFound { code_point, .. })
            if code_point == 'Q' as u32
    ));
    assert!(fonts.is_empty());
    assert!(fonts.builder().cache().is_empty());
}

#[test]
fn test_pen_advance_is_scaled() {
    let mut fonts = registry(MemoryAtlasCache::new());
    let id = fonts.add_font(ascii("rect.ttf")).unwrap();

    let layout = fonts.layout(id, "AB", Vec3::new(100.0, 50.0, 0.0)).unwrap();
    assert!(layout.is_clean());
    assert_eq!(layout.placements.len(), 2);

    let dx = layout.placements[1].translation.x - layout.placements[0].translation.x;
    let expected = RectSource::advance('A' as u32) as f32 * 14.0 / 32.0;
    assert!((dx - expected).abs() < 1e-5, "dx = {dx}, expected {expected}");
}

#[test]
fn test_invalid_middle_character_is_skipped() {
    let mut fonts = registry(MemoryAtlasCache::new());
    let id = fonts.add_font(ascii("rect.ttf")).unwrap();

    let layout = fonts.layout(id, "A\u{e9}B", Vec3::ZERO).unwrap();
    let drawn: Vec<u32> = layout.placements.iter().map(|p| p.code_point).collect();
    assert_eq!(drawn, vec!['A' as u32, 'B' as u32]);
    assert_eq!(
        layout.diagnostics,
        vec![LayoutError::OutOfRange {
            code_point: 0xE9,
            start: 32,
            end: 127,
        }]
    );

    let bytes = fonts.layout_bytes(id, b"A\xFFB", Vec3::ZERO).unwrap();
    assert_eq!(bytes.placements.len(), 2);
    assert!(matches!(
        bytes.diagnostics[..],
        [LayoutError::MalformedUtf8 { offset: 1, len: Some(1) }]
    ));
}

#[test]
fn test_measure() {
    let mut fonts = registry(MemoryAtlasCache::new());
    let id = fonts.add_font(ascii("rect.ttf")).unwrap();
    let scale = 14.0 / 32.0;

    assert_eq!(fonts.measure(id, ""), Some(Vec2::ZERO));

    let (_, height) = RectSource::size('A' as u32);
    let size = fonts.measure(id, "A").unwrap();
    assert!((size.x - RectSource::advance('A' as u32) as f32 * scale).abs() < 1e-5);
    assert!((size.y - (height as f32 - 1.0) * scale).abs() < 1e-5);
}

#[test]
fn test_atlas_image_handed_over_once() {
    let mut fonts = registry(MemoryAtlasCache::new());
    let id = fonts.add_font(ascii("rect.ttf")).unwrap();

    let image = fonts.take_atlas_image(id).unwrap();
    assert_eq!(image.dimensions(), fonts.font(id).unwrap().atlas_dimensions());
    assert!(fonts.take_atlas_image(id).is_none());
    // The table stays usable.
    assert!(fonts.layout(id, "ok", Vec3::ZERO).is_some());
}

#[test]
fn test_unknown_font_id() {
    let mut two = registry(MemoryAtlasCache::new());
    two.add_font(ascii("a.ttf")).unwrap();
    let second = two.add_font(ascii("b.ttf")).unwrap();

    let one = registry(MemoryAtlasCache::new());
    assert!(one.font(second).is_none());
    assert!(one.layout(second, "x", Vec3::ZERO).is_none());
    assert!(one.measure(second, "x").is_none());
}

#[test]
fn test_geometry_has_trailing_charmap_quad() {
    let mut fonts = registry(MemoryAtlasCache::new());
    let id = fonts.add_font(ascii("rect.ttf")).unwrap();
    let geometry = fonts.geometry(id).unwrap();

    assert_eq!(geometry.vertices().len(), 4 * (95 + 1));
    assert_eq!(geometry.indices().len(), 4 * (95 + 1));
    assert_eq!(geometry.charmap_index_range(), 380..384);

    let layout = fonts.layout(id, "!", Vec3::ZERO).unwrap();
    assert_eq!(layout.placements[0].index_range(), 4..8);
}

#[test]
fn test_registry_from_config() {
    let config = SdfTextConfig::from_toml_str(
        r#"
        [atlas]
        padding = 2
        sample_radius = 2

        [[fonts]]
        font_file = "fonts/one.ttf"
        point_size = 16
        char_start = 48
        char_count = 10

        [[fonts]]
        font_file = "fonts/two.ttf"
        point_size = 8
        "#,
    )
    .unwrap()
    .with_asset_root("assets");

    let (fonts, ids) =
        FontRegistry::from_config(RectSource::default(), MemoryAtlasCache::new(), &config).unwrap();

    assert_eq!(ids.len(), 2);
    let digits = fonts.font(ids[0]).unwrap();
    assert_eq!(digits.char_count(), 10);
    assert_eq!(digits.padding(), 2);
    assert_eq!(digits.scale(), 0.5);
    assert_eq!(
        fonts.config(ids[1]).unwrap().font_file,
        std::path::Path::new("assets/fonts/two.ttf")
    );
    assert_eq!(fonts.builder().cache().len(), 2);
}
