//! Build (or restore) a font atlas and lay out a line of text.
//!
//! The atlas is cached as `<font>.png` next to the font, so the second run
//! skips the distance-field pass.
//!
//! Run with: cargo run -p sdf-text --example build_atlas -- path/to/font.ttf [point_size] [text]

use sdf_text::glam::Vec3;
use sdf_text::{FontConfig, FontRegistry, PngAtlasCache, TtfGlyphSource};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(font_file) = args.next() else {
        eprintln!("usage: build_atlas <font.ttf> [point_size] [text]");
        std::process::exit(2);
    };
    let point_size = args
        .next()
        .map(|s| s.parse().expect("point size must be an integer"))
        .unwrap_or(14);
    let text = args.next().unwrap_or_else(|| "Hello, SDF text!".to_string());

    let mut fonts = FontRegistry::new(TtfGlyphSource::new(), PngAtlasCache::new());
    let id = fonts
        .add_font(FontConfig::new(&font_file, point_size))
        .expect("Failed to build font atlas");

    let table = fonts.font(id).expect("font was just registered");
    let (width, height) = table.atlas_dimensions();
    println!("Font atlas for {font_file}");
    println!("=====================");
    println!("  atlas:      {width}x{height} px");
    println!("  glyphs:     {}", table.char_count());
    println!("  from cache: {}", table.from_cache());
    println!();

    let layout = fonts
        .layout(id, &text, Vec3::new(0.0, 0.0, 0.0))
        .expect("font was just registered");
    let size = fonts.measure(id, &text).expect("font was just registered");
    println!("Layout of {text:?}");
    println!("  placements: {}", layout.placements.len());
    println!("  skipped:    {}", layout.diagnostics.len());
    println!("  size:       {:.2} x {:.2}", size.x, size.y);

    for placement in layout.placements.iter().take(8) {
        println!(
            "  U+{:04X} at x={:.2} indices {:?}",
            placement.code_point,
            placement.translation.x,
            placement.index_range()
        );
    }
}
