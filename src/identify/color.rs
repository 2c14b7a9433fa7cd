//! Trait color guessing.
//!
//! Trait icons are tinted with one of a handful of palette colors. The share
//! of pixels within tolerance of each palette entry picks the tag used to
//! narrow the trait catalog.

use image::{Rgba, RgbaImage};

use crate::config::PaletteColor;

/// Fraction of `icon` pixels within `tolerance` of `color` on every channel.
pub fn coverage(icon: &RgbaImage, color: [u8; 3], tolerance: u8) -> f32 {
    let total = icon.width() as usize * icon.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let hits = icon
        .pixels()
        .filter(|p| within(p, color, tolerance))
        .count();
    hits as f32 / total as f32
}

fn within(pixel: &Rgba<u8>, color: [u8; 3], tolerance: u8) -> bool {
    (0..3).all(|c| {
        let lower = color[c].saturating_sub(tolerance);
        let upper = color[c].saturating_add(tolerance);
        (lower..=upper).contains(&pixel[c])
    })
}

/// Palette entry covering the largest share of the icon.
///
/// Ties go to the earlier palette entry. Returns `None` when no pixel is
/// close to any palette color.
pub fn dominant_color<'a>(
    icon: &RgbaImage,
    palette: &'a [PaletteColor],
    tolerance: u8,
) -> Option<&'a PaletteColor> {
    let mut best: Option<(&PaletteColor, f32)> = None;
    for entry in palette {
        let share = coverage(icon, entry.rgb, tolerance);
        if share > best.map_or(0.0, |(_, s)| s) {
            best = Some((entry, share));
        }
    }
    best.map(|(entry, _)| entry)
}
