//! Brute-force signed distance field generation.
//!
//! For every pixel the generator scans a square window of
//! `[-sample_radius, +sample_radius]` around it and records the distance to
//! the nearest pixel on the other side of the glyph boundary. Distances are
//! normalized against the window's corner distance and mapped so that inside
//! pixels land in `[127, 255]` and outside pixels in `[0, 127]`.
//!
//! The cost is `O(W * H * r^2)` per glyph. Atlases are cached on disk, so
//! this runs once per font configuration.

/// Generate an 8-bit distance field from a row-major inside/outside mask.
///
/// The returned buffer has the same dimensions as the mask. A radius of zero
/// produces a hard mask: 255 inside, 0 outside.
pub fn generate(mask: &[bool], width: u32, height: u32, sample_radius: u32) -> Vec<u8> {
    let width = width as i64;
    let height = height as i64;
    let radius = sample_radius as i64;
    debug_assert_eq!(mask.len() as i64, width * height);

    let max_dist = ((2 * radius * radius) as f32).sqrt();
    let mut field = vec![0u8; mask.len()];

    for k in 0..height {
        for l in 0..width {
            let inside = mask[(l + k * width) as usize];

            let mut distance = max_dist;
            for j in (k - radius).max(0)..=(k + radius).min(height - 1) {
                for i in (l - radius).max(0)..=(l + radius).min(width - 1) {
                    if mask[(i + j * width) as usize] != inside {
                        let d = (((i - l) * (i - l) + (j - k) * (j - k)) as f32).sqrt();
                        distance = distance.min(d);
                    }
                }
            }

            field[(l + k * width) as usize] = encode(inside, distance, max_dist);
        }
    }

    field
}

/// Map a distance to the 0-255 range, 127 being the boundary.
fn encode(inside: bool, distance: f32, max_dist: f32) -> u8 {
    let normalized = if max_dist > 0.0 {
        distance / max_dist
    } else {
        1.0
    };
    let value = if inside {
        0.5 + normalized * 0.5
    } else {
        0.5 - normalized * 0.5
    };
    (value * 255.0) as u8
}
